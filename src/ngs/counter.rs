use crate::error::ToolError;
use anyhow::{Context, Result};
use seahash::SeaHasher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::hash::BuildHasherDefault;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub const SEQUENCE_COLUMN: &str = "dna_seq";

type SeqIndex = HashMap<String, usize, BuildHasherDefault<SeaHasher>>;

/// Slice of each merged read that identifies the library member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountWindow {
    pub start: usize,
    pub end: usize,
}

impl Default for CountWindow {
    fn default() -> Self {
        Self { start: 58, end: 223 }
    }
}

impl CountWindow {
    /// Window of `read`, clamped to its length.
    pub fn extract<'a>(&self, read: &'a str) -> &'a str {
        let end = self.end.min(read.len());
        let start = self.start.min(end);
        read.get(start..end).unwrap_or("")
    }
}

/// Per-variant tallies for one merged-reads file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantCounts {
    pub counts: Vec<u64>,
    pub reads_scanned: u64,
    pub reads_matched: u64,
}

/// Reference variants plus any per-sample count columns added so far.
#[derive(Debug, Clone)]
pub struct VariantTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    seq_column: usize,
    index: SeqIndex,
}

impl VariantTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open reference table {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to load reference table {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let seq_column = headers
            .iter()
            .position(|h| h == SEQUENCE_COLUMN)
            .ok_or_else(|| ToolError::MissingColumn(SEQUENCE_COLUMN.to_string()))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        // First occurrence wins for duplicated reference sequences.
        let mut index = SeqIndex::default();
        for (i, row) in rows.iter().enumerate() {
            index.entry(row[seq_column].clone()).or_insert(i);
        }

        Ok(Self {
            headers,
            rows,
            seq_column,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Values of a named column, if present.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let col = self.headers.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|r| r[col].as_str()).collect())
    }

    /// Tallies reads whose window exactly equals a reference sequence.
    pub fn count_reads<I, S>(&self, reads: I, window: &CountWindow) -> VariantCounts
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = self.empty_counts();
        for read in reads {
            self.tally_read(&mut tally, read.as_ref(), window);
        }
        tally
    }

    /// Streams a merged-reads file, one read per line.
    pub fn count_file(&self, path: &Path, window: &CountWindow) -> Result<VariantCounts> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open merged reads {}", path.display()))?;
        let mut tally = self.empty_counts();
        for line in BufReader::new(file).lines() {
            let line =
                line.with_context(|| format!("Failed to read merged reads {}", path.display()))?;
            self.tally_read(&mut tally, &line, window);
        }
        Ok(tally)
    }

    fn empty_counts(&self) -> VariantCounts {
        VariantCounts {
            counts: vec![0; self.rows.len()],
            ..Default::default()
        }
    }

    fn tally_read(&self, tally: &mut VariantCounts, read: &str, window: &CountWindow) {
        tally.reads_scanned += 1;
        if let Some(&i) = self.index.get(window.extract(read)) {
            tally.counts[i] += 1;
            tally.reads_matched += 1;
        }
    }

    /// Appends a count column, replacing an existing column of the same name.
    pub fn add_count_column(&mut self, name: &str, counts: &VariantCounts) -> Result<(), ToolError> {
        if counts.counts.len() != self.rows.len() {
            return Err(ToolError::CountLengthMismatch {
                column: name.to_string(),
                got: counts.counts.len(),
                expected: self.rows.len(),
            });
        }

        match self.headers.iter().position(|h| h == name) {
            Some(col) => {
                for (row, count) in self.rows.iter_mut().zip(&counts.counts) {
                    row[col] = count.to_string();
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, count) in self.rows.iter_mut().zip(&counts.counts) {
                    row.push(count.to_string());
                }
            }
        }
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "seq_ID,dna_seq,aa\nv1,AAAA,K\nv2,CCCC,P\nv3,AAAA,K\n";

    fn window() -> CountWindow {
        CountWindow { start: 2, end: 6 }
    }

    #[test]
    fn loads_columns() {
        let table = VariantTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("seq_ID").unwrap(), vec!["v1", "v2", "v3"]);
        assert_eq!(table.column("dna_seq").unwrap(), vec!["AAAA", "CCCC", "AAAA"]);
    }

    #[test]
    fn missing_sequence_column_is_an_error() {
        let err = VariantTable::from_reader("seq_ID,aa\nv1,K\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("dna_seq"));
    }

    #[test]
    fn counts_exact_window_matches_only() {
        let table = VariantTable::from_reader(TABLE.as_bytes()).unwrap();
        let reads = ["GGAAAAGG", "TTCCCCTT", "GGAAAAGG", "GGAAATGG", "GGCCCC"];
        let tally = table.count_reads(reads, &window());

        // Duplicate AAAA row never receives counts.
        assert_eq!(tally.counts, vec![2, 2, 0]);
        assert_eq!(tally.reads_scanned, 5);
        assert_eq!(tally.reads_matched, 4);
    }

    #[test]
    fn counting_is_idempotent() {
        let table = VariantTable::from_reader(TABLE.as_bytes()).unwrap();
        let reads = ["GGAAAAGG", "TTCCCCTT"];
        assert_eq!(
            table.count_reads(reads, &window()),
            table.count_reads(reads, &window())
        );
    }

    #[test]
    fn window_clamps_like_a_slice() {
        let w = CountWindow { start: 58, end: 223 };
        assert_eq!(w.extract("ACGT"), "");
        let read = "A".repeat(60);
        assert_eq!(w.extract(&read), "AA");
    }

    #[test]
    fn count_column_appends_then_overwrites() {
        let mut table = VariantTable::from_reader(TABLE.as_bytes()).unwrap();
        let tally = table.count_reads(["GGAAAAGG"], &window());
        table.add_count_column("s1_count", &tally).unwrap();
        assert_eq!(table.column("s1_count").unwrap(), vec!["1", "0", "0"]);

        let tally = table.count_reads(["TTCCCCTT", "TTCCCCTT"], &window());
        table.add_count_column("s1_count", &tally).unwrap();
        assert_eq!(table.headers().len(), 4);
        assert_eq!(table.column("s1_count").unwrap(), vec!["0", "2", "0"]);
    }

    #[test]
    fn count_column_length_is_checked() {
        let mut table = VariantTable::from_reader(TABLE.as_bytes()).unwrap();
        let bogus = VariantCounts {
            counts: vec![1],
            ..Default::default()
        };
        assert!(table.add_count_column("x", &bogus).is_err());
    }
}
