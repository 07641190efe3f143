use crate::fitness::trajectory::Direction;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge one R1/R2 FASTQ pair into consensus reads, one per line
    Merge {
        /// Forward (R1) FASTQ file, optionally compressed
        r1: PathBuf,
        /// Reverse (R2) FASTQ file, optionally compressed
        r2: PathBuf,
        /// Output file for merged reads
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Count exact library matches in merged-read files
    Count {
        /// CSV with a 'dna_seq' column (optionally 'seq_ID')
        reference_csv: PathBuf,
        /// Output counts CSV
        output_csv: PathBuf,
        /// Merged-read files, one count column each
        #[arg(required = true)]
        merged: Vec<PathBuf>,
        /// Date label appended to column names (defaults to today, YYYYMMDD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Merge every sample in a directory and count library members
    Preprocess {
        /// Directory holding the (unzipped or gzipped) FASTQ files
        input_directory: PathBuf,
        /// Sequencing date, used for naming outputs
        date: String,
        /// Where merged-read files are written
        merged_reads_directory: PathBuf,
        /// CSV with a 'dna_seq' column to match reads against
        input_seq_csv: PathBuf,
        /// Output counts CSV
        output_counts_file: PathBuf,
        /// Take pairs from sra_file_pairs.csv instead of scanning file names
        #[arg(long)]
        manifest: bool,
    },

    /// Annotate a combinatorial library with enrichment and model predictions
    Predict {
        /// Library CSV with 'Variants', 'Count input' and 'Count selected'
        library_csv: PathBuf,
        /// Output CSV
        output_csv: PathBuf,
        /// Root of the '<kind>s/model_<i>' ensembles
        #[arg(long, default_value = "pretrained_models")]
        models_dir: PathBuf,
        /// Directory with the single 'gb1_<kind>' models
        #[arg(long, default_value = "pretrained_models/other_models")]
        single_dir: PathBuf,
        /// Model architectures to score with
        #[arg(long, value_delimiter = ',', default_value = "lr,fcn,gcn,cnn")]
        kinds: Vec<String>,
        /// Replicates expected per architecture
        #[arg(long, default_value = "100")]
        ensemble_size: usize,
    },

    /// Build greedy mutational trajectories from model ensembles
    Trajectory {
        /// Which way to walk
        #[arg(value_enum)]
        direction: Direction,
        /// Output CSV
        output_csv: PathBuf,
        /// Root of the '<kind>s/model_<i>' ensembles
        #[arg(long, default_value = "pretrained_models")]
        models_dir: PathBuf,
        /// Model architectures to walk with
        #[arg(long, value_delimiter = ',', default_value = "lr,fcn,gcn,cnn")]
        kinds: Vec<String>,
        /// Replicates expected per architecture
        #[arg(long, default_value = "100")]
        ensemble_size: usize,
        /// Maximum number of mutations per trajectory
        #[arg(long, default_value = "55")]
        steps: usize,
    },

    /// Write the default configuration file
    InitConfig {
        /// Destination (defaults to the user config directory)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
