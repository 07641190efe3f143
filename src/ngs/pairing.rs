use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the pair manifest written next to SRA downloads.
pub const MANIFEST_FILE: &str = "sra_file_pairs.csv";

/// Compression suffixes dropped from merged-read names; merged reads are plain text.
const COMPRESSED_SUFFIXES: [&str; 4] = [".gz", ".bz2", ".xz", ".zst"];

/// Forward (R1) and reverse (R2) FASTQ file names for one sample.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SamplePair {
    #[serde(rename = "R1")]
    pub r1: String,
    #[serde(rename = "R2")]
    pub r2: String,
}

/// How per-sample count columns and the counts file are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountNaming {
    /// `<prefix><date>_count`, counts written to the path as given.
    DateSuffixed { date: String },
    /// `<prefix>count`, counts written to `<date>_<file name>`.
    Plain { date: String },
}

impl CountNaming {
    pub fn column_name(&self, pair: &SamplePair) -> String {
        match self {
            CountNaming::DateSuffixed { date } => format!("{}{}_count", pair.prefix(), date),
            CountNaming::Plain { .. } => format!("{}count", pair.prefix()),
        }
    }

    pub fn output_path(&self, requested: &Path) -> PathBuf {
        match self {
            CountNaming::DateSuffixed { .. } => requested.to_path_buf(),
            CountNaming::Plain { date } => {
                let file_name = requested
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                requested.with_file_name(format!("{}_{}", date, file_name))
            }
        }
    }
}

impl SamplePair {
    pub fn new(r1: impl Into<String>, r2: impl Into<String>) -> Self {
        Self {
            r1: r1.into(),
            r2: r2.into(),
        }
    }

    /// Sample prefix: the R1 file name up to its first `R1`.
    pub fn prefix(&self) -> &str {
        self.r1.split("R1").next().unwrap_or("")
    }

    pub fn merged_file_name(&self) -> String {
        let name = self.r1.replace("R1", "both_reads");
        COMPRESSED_SUFFIXES
            .iter()
            .find_map(|suffix| name.strip_suffix(*suffix))
            .map(str::to_string)
            .unwrap_or(name)
    }
}

/// Column names claimed by more than one pair, in first-seen order.
pub fn duplicate_columns(naming: &CountNaming, pairs: &[SamplePair]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for pair in pairs {
        let column = naming.column_name(pair);
        if !seen.insert(column.clone()) && !duplicates.contains(&column) {
            duplicates.push(column);
        }
    }
    duplicates
}

/// R2 mate name for an R1 file name.
pub fn mate_name(r1: &str) -> String {
    r1.replace("R1", "R2")
}

/// Finds R1/R2 pairs by file name in `dir`.
pub fn discover_pairs(dir: &Path) -> Result<Vec<SamplePair>> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            Some(entry.file_name().to_string_lossy().into_owned())
        })
        .collect();
    names.sort();

    let mut pairs = Vec::new();
    for name in names.iter().filter(|n| n.contains(".fastq") && n.contains("R1")) {
        let mate = mate_name(name);
        if names.contains(&mate) {
            info!("Found pair of file reads {}, {}", name, mate);
            pairs.push(SamplePair::new(name.clone(), mate));
        } else {
            warn!("Unable to find match for {}", name);
        }
    }
    Ok(pairs)
}

/// Reads the `R1`/`R2` manifest from `dir`.
pub fn read_manifest(dir: &Path) -> Result<Vec<SamplePair>> {
    let path = dir.join(MANIFEST_FILE);
    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("Failed to open manifest {}", path.display()))?;
    let mut pairs = Vec::new();
    for row in reader.deserialize::<SamplePair>() {
        let pair: SamplePair = row.with_context(|| format!("Malformed row in {}", path.display()))?;
        pairs.push(pair);
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_r1() {
        let pair = SamplePair::new("lib3_S1_L001_R1_001.fastq", "lib3_S1_L001_R2_001.fastq");
        assert_eq!(pair.prefix(), "lib3_S1_L001_");
        assert_eq!(pair.merged_file_name(), "lib3_S1_L001_both_reads_001.fastq");
        assert_eq!(mate_name(&pair.r1), pair.r2);
    }

    #[test]
    fn merged_name_drops_compression_suffix() {
        let pair = SamplePair::new("x_R1.fastq.gz", "x_R2.fastq.gz");
        assert_eq!(pair.merged_file_name(), "x_both_reads.fastq");
        let pair = SamplePair::new("x_R1.fq.bz2", "x_R2.fq.bz2");
        assert_eq!(pair.merged_file_name(), "x_both_reads.fq");
        let pair = SamplePair::new("x_R1.fastq", "x_R2.fastq");
        assert_eq!(pair.merged_file_name(), "x_both_reads.fastq");
    }

    #[test]
    fn prefix_stops_at_first_r1() {
        // SRR accessions starting with "SRR1" are cut inside the accession.
        let pair = SamplePair::new("SRR1_R1.fastq", "SRR1_R2.fastq");
        assert_eq!(pair.prefix(), "SR");
        let pair = SamplePair::new("SRR100_R1.fastq", "SRR100_R2.fastq");
        assert_eq!(pair.prefix(), "SR");
        let pair = SamplePair::new("SRR2_R1.fastq", "SRR2_R2.fastq");
        assert_eq!(pair.prefix(), "SRR2_");
    }

    #[test]
    fn colliding_columns_are_reported_once() {
        let naming = CountNaming::Plain {
            date: "20190312".into(),
        };
        let pairs = [
            SamplePair::new("SRR100_R1.fastq", "SRR100_R2.fastq"),
            SamplePair::new("SRR2_R1.fastq", "SRR2_R2.fastq"),
            SamplePair::new("SRR123_R1.fastq", "SRR123_R2.fastq"),
            SamplePair::new("SRR150_R1.fastq", "SRR150_R2.fastq"),
        ];
        assert_eq!(duplicate_columns(&naming, &pairs), vec!["SRcount"]);
        assert!(duplicate_columns(&naming, &pairs[..2]).is_empty());
    }

    #[test]
    fn column_naming_styles() {
        let dated = CountNaming::DateSuffixed {
            date: "20190312".into(),
        };
        let plain = CountNaming::Plain {
            date: "20190312".into(),
        };
        let pair = SamplePair::new("SRR1_R1.fastq", "SRR1_R2.fastq");
        assert_eq!(dated.column_name(&pair), "SR20190312_count");
        assert_eq!(plain.column_name(&pair), "SRcount");

        let pair = SamplePair::new("lib7_R1.fastq", "lib7_R2.fastq");
        assert_eq!(dated.column_name(&pair), "lib7_20190312_count");
        assert_eq!(plain.column_name(&pair), "lib7_count");
        assert_eq!(
            plain.output_path(Path::new("out/counts.csv")),
            PathBuf::from("out/20190312_counts.csv")
        );
        assert_eq!(
            dated.output_path(Path::new("out/counts.csv")),
            PathBuf::from("out/counts.csv")
        );
    }
}
