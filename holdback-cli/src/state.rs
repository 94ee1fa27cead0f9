use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$HOLDBACK_HOME`, else `~/.holdback`.
pub fn holdback_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HOLDBACK_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".holdback"))
}

pub fn ensure_holdback_home() -> Result<PathBuf> {
    let dir = holdback_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_sessions_dir() -> Result<PathBuf> {
    Ok(holdback_home()?.join("sessions"))
}
