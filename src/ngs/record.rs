use log::warn;

/// A single FASTQ entry as read from an R1/R2 file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FastqRecord {
    pub name: String,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl FastqRecord {
    pub fn new(name: impl Into<String>, seq: impl Into<Vec<u8>>, qual: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            seq: seq.into(),
            qual: qual.into(),
        }
    }

    /// Parses an accumulated record block: identifier, read, separator, quality.
    ///
    /// Parsing is deliberately loose. A block without a read line is logged and
    /// yields an empty read, which the merger later rejects as too short.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let line = |i: usize| lines.get(i).map(|l| l.as_ref().trim_end_matches(['\n', '\r']));

        let name = line(0).unwrap_or_default().to_string();
        let seq = match line(1) {
            Some(seq) => seq.as_bytes().to_vec(),
            None => {
                let block: Vec<&str> = lines.iter().map(|l| l.as_ref()).collect();
                warn!("Malformed FASTQ record, no read line: {:?}", block);
                Vec::new()
            }
        };
        let qual = line(3).map(|q| q.as_bytes().to_vec()).unwrap_or_default();

        Self { name, seq, qual }
    }

    /// Read identifier without the leading `@` and any trailing description.
    pub fn id(&self) -> &str {
        self.name
            .trim_start_matches('@')
            .split_whitespace()
            .next()
            .unwrap_or("")
    }

    pub fn has_consistent_lengths(&self) -> bool {
        self.seq.len() == self.qual.len()
    }
}
