use crate::config::Config;
use crate::ngs::pipeline::merge_pair_files;
use anyhow::Result;
use std::path::PathBuf;

pub fn run(config: &Config, r1: PathBuf, r2: PathBuf, output: PathBuf, quiet: bool) -> Result<()> {
    let merged = merge_pair_files(&r1, &r2, &output, &config.merge, quiet)?;
    println!("Merged {} reads into {}", merged, output.display());
    Ok(())
}
