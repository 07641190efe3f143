use crate::ngs::counter::{CountWindow, VariantTable};
use crate::ngs::merge::{merge_read_pair, MergeLayout};
use crate::ngs::pairing::{discover_pairs, duplicate_columns, read_manifest, CountNaming, SamplePair};
use crate::ngs::reader::PairedFastqReader;
use crate::utils::progress_bar_builder::{ProgressBarBuilder, FILE_BAR_TEMPLATE, READ_SPINNER_TEMPLATE};
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where sample pairs come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSource {
    /// Scan the input directory for `R1`/`R2` file names.
    DirectoryScan,
    /// Read `sra_file_pairs.csv` from the input directory.
    Manifest,
}

#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    pub input_dir: PathBuf,
    pub date: String,
    pub merged_dir: PathBuf,
    pub reference_csv: PathBuf,
    pub output_csv: PathBuf,
    pub source: PairSource,
    pub layout: MergeLayout,
    pub window: CountWindow,
    pub quiet: bool,
}

impl PreprocessOptions {
    fn naming(&self) -> CountNaming {
        match self.source {
            PairSource::DirectoryScan => CountNaming::DateSuffixed {
                date: self.date.clone(),
            },
            PairSource::Manifest => CountNaming::Plain {
                date: self.date.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSummary {
    pub pair: SamplePair,
    pub merged_path: PathBuf,
    pub merged_reads: u64,
    pub column: String,
    pub reads_matched: u64,
}

#[derive(Debug, Clone)]
pub struct PreprocessReport {
    pub samples: Vec<SampleSummary>,
    pub counts_path: PathBuf,
    /// Count columns shared by several samples; the last sample's counts win.
    pub collisions: Vec<String>,
}

/// Merges every read pair of one sample into `out_path`, one consensus read per line.
pub fn merge_pair_files(
    r1: &Path,
    r2: &Path,
    out_path: &Path,
    layout: &MergeLayout,
    quiet: bool,
) -> Result<u64> {
    layout.validate()?;
    let reader = PairedFastqReader::open(r1, r2)?;
    let file = File::create(out_path)
        .with_context(|| format!("Failed to create {}", out_path.display()))?;
    let mut writer = BufWriter::new(file);

    let progress = ProgressBarBuilder::new(format!("Merging {}", display_name(r1)))
        .with_template(READ_SPINNER_TEMPLATE)
        .with_tick()
        .hidden(quiet)
        .build()?;

    let mut merged = 0u64;
    for pair in reader {
        let (fwd, rev) = pair?;
        let consensus = merge_read_pair(&fwd, &rev, layout)
            .with_context(|| format!("Failed to merge reads from {}", display_name(r1)))?;
        writeln!(writer, "{}", consensus)?;
        merged += 1;
        if merged % 10_000 == 0 {
            progress.set_position(merged);
        }
    }
    writer.flush()?;

    progress.finish_with_message(format!("Merged {} reads", merged));
    info!("Merged {} reads into {}", merged, out_path.display());
    Ok(merged)
}

/// Merges one sample into `merged_dir`, returning the output path and read count.
pub fn merge_sample(
    pair: &SamplePair,
    input_dir: &Path,
    merged_dir: &Path,
    layout: &MergeLayout,
    quiet: bool,
) -> Result<(PathBuf, u64)> {
    info!("Processing {}, {}", pair.r1, pair.r2);
    let out_path = merged_dir.join(pair.merged_file_name());
    let merged = merge_pair_files(
        &input_dir.join(&pair.r1),
        &input_dir.join(&pair.r2),
        &out_path,
        layout,
        quiet,
    )?;
    Ok((out_path, merged))
}

/// Full preprocessing run: merge every sample, then count every merged file.
pub fn run_preprocessing(options: &PreprocessOptions) -> Result<PreprocessReport> {
    let pairs = match options.source {
        PairSource::DirectoryScan => discover_pairs(&options.input_dir)?,
        PairSource::Manifest => read_manifest(&options.input_dir)?,
    };
    if pairs.is_empty() {
        anyhow::bail!("No R1/R2 FASTQ pairs found in {}", options.input_dir.display());
    }

    let mut table = VariantTable::from_path(&options.reference_csv)?;
    let naming = options.naming();
    let collisions = duplicate_columns(&naming, &pairs);
    for column in &collisions {
        warn!(
            "Several samples map to count column {}; only the last one is kept",
            column
        );
    }

    let files_bar = ProgressBarBuilder::new("Merging read pairs")
        .with_template(FILE_BAR_TEMPLATE)
        .with_length(pairs.len() as u64)
        .hidden(options.quiet)
        .build()?;

    let mut merged_files = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        let (path, reads) = merge_sample(
            pair,
            &options.input_dir,
            &options.merged_dir,
            &options.layout,
            options.quiet,
        )?;
        merged_files.push((pair.clone(), path, reads));
        files_bar.inc(1);
    }
    files_bar.finish_with_message("All read pairs merged");

    println!("All reads merged, final read counts:");
    for (pair, _, reads) in &merged_files {
        println!("Experiment: {}  --  Total reads: {}", pair.prefix(), reads);
    }

    let count_bar = ProgressBarBuilder::new("Identifying reads")
        .with_template(FILE_BAR_TEMPLATE)
        .with_length(merged_files.len() as u64)
        .hidden(options.quiet)
        .build()?;

    let mut samples = Vec::with_capacity(merged_files.len());
    for (pair, merged_path, merged_reads) in merged_files {
        let column = naming.column_name(&pair);
        let counts = table.count_file(&merged_path, &options.window)?;
        info!(
            "Determined counts for {} reads from {} dataset ({} matched)",
            counts.reads_scanned, column, counts.reads_matched
        );
        table.add_count_column(&column, &counts)?;
        samples.push(SampleSummary {
            pair,
            merged_path,
            merged_reads,
            column,
            reads_matched: counts.reads_matched,
        });
        count_bar.inc(1);
    }
    count_bar.finish_with_message("Counting finished");

    let counts_path = naming.output_path(&options.output_csv);
    table.write_csv(&counts_path)?;
    info!("Wrote counts for {} samples to {}", samples.len(), counts_path.display());

    Ok(PreprocessReport {
        samples,
        counts_path,
        collisions,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
