use crate::config::Config;
use crate::ngs::{run_preprocessing, PairSource, PreprocessOptions};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &Config,
    input_directory: PathBuf,
    date: String,
    merged_reads_directory: PathBuf,
    input_seq_csv: PathBuf,
    output_counts_file: PathBuf,
    manifest: bool,
    quiet: bool,
) -> Result<()> {
    fs::create_dir_all(&merged_reads_directory)
        .with_context(|| format!("Failed to create {}", merged_reads_directory.display()))?;

    let options = PreprocessOptions {
        input_dir: input_directory,
        date,
        merged_dir: merged_reads_directory,
        reference_csv: input_seq_csv,
        output_csv: output_counts_file,
        source: if manifest {
            PairSource::Manifest
        } else {
            PairSource::DirectoryScan
        },
        layout: config.merge,
        window: config.count,
        quiet,
    };

    let report = run_preprocessing(&options)?;
    println!(
        "Counted {} samples, results in {}",
        report.samples.len(),
        report.counts_path.display()
    );
    Ok(())
}
