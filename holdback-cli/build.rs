use std::env;
use std::path::Path;
use std::process::Command;

/// Short commit id for `--version`; a packager can pin it with `HOLDBACK_BUILD_SHA`.
fn main() {
    println!("cargo:rerun-if-env-changed=HOLDBACK_BUILD_SHA");

    let sha = env::var("HOLDBACK_BUILD_SHA")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(git_sha)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=HOLDBACK_BUILD_SHA={sha}");
}

fn git_sha() -> Option<String> {
    let workspace = Path::new(&env::var("CARGO_MANIFEST_DIR").ok()?).parent()?.to_path_buf();
    let head = workspace.join(".git").join("HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }

    let out = Command::new("git")
        .current_dir(&workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (out.status.success() && !sha.is_empty()).then_some(sha)
}
