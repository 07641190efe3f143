use crate::config::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn run(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path().context("Failed to determine the user config directory")?,
    };
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default().save(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
