//! holdback-core: Core types and tolerant parsing for statement reconciliation

pub mod amount;
pub mod categories;
pub mod fields;
pub mod mca;
pub mod normalize;
pub mod numeric;
pub mod transaction;

pub use amount::{resolve, resolve_fields, amount_from_text, AMOUNT_FIELDS};
pub use categories::{
    is_business_name_and_owner, is_excluded, is_funder_list, is_pseudo_category,
    CategoryTree, MainCategory, SubcategoryKey, BUSINESS_OWNER_CATEGORY, FUNDER_LIST_CATEGORY,
};
pub use mca::{McaItem, BUSINESS_DAYS_PER_WEEK};
pub use normalize::normalize;
pub use numeric::{is_usable, parse_loose_number, round_half_even};
pub use transaction::{sum_rows, TransactionRow};
