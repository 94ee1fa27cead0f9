use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use holdback_core::SubcategoryKey;
use holdback_finance::{PersistedRevenue, ReviewSession, RevenueStore};
use holdback_ingest::load_document;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod state;
mod store;

use config::{Config, OutputFormat};
use store::FileStore;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("HOLDBACK_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "holdback", version = VERSION, about = "Statement revenue review and funder holdback")]
struct Cli {
    /// Output format (default from config, else text)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate a statement document and print reconciliation + holdback
    Review {
        /// Extracted statement document (JSON)
        #[arg(long)]
        doc: PathBuf,

        /// Only count these funder indices in the holdback (comma separated)
        #[arg(long, value_delimiter = ',')]
        funders: Option<Vec<usize>>,
    },

    /// Flip inclusion of one row, or of a whole subcategory, then save
    Toggle {
        #[arg(long)]
        doc: PathBuf,

        /// Subcategory key, `Main::Sub` (flat mains: `Main::Main` or just `Main`)
        #[arg(long)]
        key: String,

        /// Row index within the subcategory
        #[arg(long, conflicts_with = "all")]
        row: Option<usize>,

        /// Toggle every row in the subcategory
        #[arg(long)]
        all: bool,
    },

    /// Persist the current selection and revenue figure
    Save {
        #[arg(long)]
        doc: PathBuf,
    },

    /// Include every row again and save
    Reset {
        #[arg(long)]
        doc: PathBuf,
    },

    /// Write a subcategory's rows with their inclusion flags
    Export {
        #[arg(long)]
        doc: PathBuf,
        #[arg(long)]
        key: String,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.holdback/config.toml
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_logging(&cfg);

    let format = cli.format.unwrap_or(cfg.output.format);

    match cli.command {
        Command::Review { doc, funders } => {
            let (mut session, _) = open_session(&cfg, &doc)?;
            if let Some(indices) = funders {
                session.select_funders(indices);
            }
            print_session(&mut session, format)?;
        }

        Command::Toggle { doc, key, row, all } => {
            let (mut session, mut store) = open_session(&cfg, &doc)?;
            let key = resolve_key(&session, &key)?;
            match (row, all) {
                (Some(index), false) => {
                    let len = session.rows(&key).len();
                    if index >= len {
                        bail!("row {index} out of range for {key} ({len} rows)");
                    }
                    session.toggle_row(&key, index);
                }
                (None, true) => {
                    session.toggle_all(&key);
                }
                _ => bail!("pass --row <n> or --all"),
            }
            save(&mut session, &mut store)?;
            print_session(&mut session, format)?;
        }

        Command::Save { doc } => {
            let (mut session, mut store) = open_session(&cfg, &doc)?;
            save(&mut session, &mut store)?;
            print_session(&mut session, format)?;
        }

        Command::Reset { doc } => {
            let (mut session, mut store) = open_session(&cfg, &doc)?;
            session.reset_selection();
            save(&mut session, &mut store)?;
            print_session(&mut session, format)?;
        }

        Command::Export { doc, key, out } => {
            let (session, _) = open_session(&cfg, &doc)?;
            let key = resolve_key(&session, &key)?;
            match (format, out) {
                (OutputFormat::Json, None) => {
                    println!("{}", serde_json::to_string_pretty(&report::rows_json(&session, &key))?);
                }
                (OutputFormat::Json, Some(path)) => {
                    let body = serde_json::to_string_pretty(&report::rows_json(&session, &key))?;
                    std::fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                (OutputFormat::Text, None) => {
                    report::export_rows(&session, &key, io::stdout().lock())?;
                }
                (OutputFormat::Text, Some(path)) => {
                    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
                    report::export_rows(&session, &key, file)?;
                    println!("Wrote {}", path.display());
                }
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

/// `HOLDBACK_LOG` wins over the config filter. Logs go to stderr.
fn init_logging(cfg: &Config) {
    let filter = EnvFilter::try_from_env("HOLDBACK_LOG")
        .or_else(|_| EnvFilter::try_new(&cfg.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load the document and fold in any selection saved for it.
fn open_session(cfg: &Config, doc: &Path) -> Result<(ReviewSession, FileStore)> {
    let document = load_document(doc).with_context(|| format!("loading {}", doc.display()))?;
    let mut session = ReviewSession::from_document(&document);
    let mut store = FileStore::new(cfg.sessions_dir()?);

    if let Some(saved) = store
        .load(session.document_id())
        .with_context(|| format!("reading saved session from {}", store.dir().display()))?
    {
        debug!(generation = saved.generation, "restoring saved session");
        session.restore(&saved);
        session.set_persisted(
            PersistedRevenue::new(Some(saved.difference)).with_generation(Some(saved.generation)),
        );
    }
    Ok((session, store))
}

fn resolve_key(session: &ReviewSession, raw: &str) -> Result<SubcategoryKey> {
    let candidates = [SubcategoryKey::from_raw(raw), SubcategoryKey::flat(raw)];
    match candidates.into_iter().find(|k| session.aggregate().contains_key(k)) {
        Some(key) => Ok(key),
        None => bail!("unknown subcategory: {raw}"),
    }
}

fn save(session: &mut ReviewSession, store: &mut FileStore) -> Result<()> {
    let payload = session
        .save(store)
        .with_context(|| format!("saving to {}", store.dir().display()))?;
    eprintln!(
        "Saved {} (generation {}, revenue {})",
        payload.document_id,
        payload.generation,
        report::fmt_money(payload.difference)
    );
    Ok(())
}

fn print_session(session: &mut ReviewSession, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report::render_text(session)),
        OutputFormat::Json => println!("{}", report::render_json(session)?),
    }
    Ok(())
}
