use crate::error::ToolError;
use crate::ngs::record::FastqRecord;
use bio::alphabets::{dna, Alphabet};
use log::warn;
use serde::{Deserialize, Serialize};

/// ASCII offset of Phred+33 quality strings.
pub const PHRED_OFFSET: i16 = 33;

/// Geometry of the amplicon the read pairs are merged into.
///
/// Positions `0..overlap_start` come from the reverse read, positions
/// `reverse_len..merged_len` from the reverse-complemented forward read
/// shifted by `overlap_start`, and the overlap in between goes to whichever
/// read has the strictly higher quality (ties stay with the reverse read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeLayout {
    #[serde(default = "default_merged_len")]
    pub merged_len: usize,
    #[serde(default = "default_reverse_len")]
    pub reverse_len: usize,
    #[serde(default = "default_overlap_start")]
    pub overlap_start: usize,
}

fn default_merged_len() -> usize {
    270
}

fn default_reverse_len() -> usize {
    151
}

fn default_overlap_start() -> usize {
    119
}

impl Default for MergeLayout {
    fn default() -> Self {
        Self {
            merged_len: default_merged_len(),
            reverse_len: default_reverse_len(),
            overlap_start: default_overlap_start(),
        }
    }
}

impl MergeLayout {
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.overlap_start > self.reverse_len || self.reverse_len > self.merged_len {
            return Err(ToolError::InvalidLayout(format!(
                "need overlap_start ({}) <= reverse_len ({}) <= merged_len ({})",
                self.overlap_start, self.reverse_len, self.merged_len
            )));
        }
        Ok(())
    }

    /// Minimum forward read length (after reverse complement) the layout indexes into.
    fn forward_needed(&self) -> usize {
        self.merged_len.saturating_sub(self.overlap_start)
    }

    fn overlap_len(&self) -> usize {
        self.reverse_len - self.overlap_start
    }
}

/// Converts a Phred+33 quality string to integer scores.
pub fn phred_scores(qual: &[u8]) -> Vec<i16> {
    qual.iter().map(|&q| q as i16 - PHRED_OFFSET).collect()
}

fn read_alphabet() -> Alphabet {
    Alphabet::new(b"ACGTN")
}

/// Reverse complement over the strict `ACGTN` alphabet.
pub fn reverse_complement(read_name: &str, seq: &[u8]) -> Result<Vec<u8>, ToolError> {
    let alphabet = read_alphabet();
    if !alphabet.is_word(seq) {
        let base = seq
            .iter()
            .copied()
            .find(|&b| !alphabet.is_word([b]))
            .unwrap_or(b'?');
        return Err(ToolError::InvalidBase {
            read: read_name.to_string(),
            base: base as char,
        });
    }
    Ok(dna::revcomp(seq))
}

fn ensure_len(read: &FastqRecord, what: &'static str, len: usize, needed: usize) -> Result<(), ToolError> {
    if len < needed {
        return Err(ToolError::ReadTooShort {
            read: read.name.clone(),
            what,
            len,
            needed,
        });
    }
    Ok(())
}

/// Merges a forward/reverse read pair into one consensus read of `layout.merged_len` bases.
pub fn merge_read_pair(
    fwd: &FastqRecord,
    rev: &FastqRecord,
    layout: &MergeLayout,
) -> Result<String, ToolError> {
    layout.validate()?;
    if !rev.seq.is_ascii() {
        let base = String::from_utf8_lossy(&rev.seq)
            .chars()
            .find(|c| !c.is_ascii())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(ToolError::InvalidBase {
            read: rev.name.clone(),
            base,
        });
    }
    if !fwd.has_consistent_lengths() || !rev.has_consistent_lengths() {
        warn!(
            "Read and quality score lengths differ for {} / {} ({}/{} vs {}/{})",
            fwd.id(),
            rev.id(),
            fwd.seq.len(),
            fwd.qual.len(),
            rev.seq.len(),
            rev.qual.len()
        );
    }

    let fwd_read = reverse_complement(&fwd.name, &fwd.seq)?;
    let fwd_qual: Vec<i16> = fwd
        .qual
        .iter()
        .rev()
        .map(|&q| q as i16 - PHRED_OFFSET)
        .collect();
    let rev_qual = phred_scores(&rev.qual);

    ensure_len(rev, "reverse read", rev.seq.len(), layout.reverse_len)?;
    ensure_len(fwd, "forward read", fwd_read.len(), layout.forward_needed())?;
    if layout.overlap_len() > 0 {
        ensure_len(rev, "reverse quality", rev_qual.len(), layout.reverse_len)?;
        ensure_len(fwd, "forward quality", fwd_qual.len(), layout.overlap_len())?;
    }

    let mut merged = Vec::with_capacity(layout.merged_len);
    for i in 0..layout.merged_len {
        let base = if i < layout.overlap_start {
            rev.seq[i]
        } else if i >= layout.reverse_len {
            fwd_read[i - layout.overlap_start]
        } else if rev_qual[i] < fwd_qual[i - layout.overlap_start] {
            fwd_read[i - layout.overlap_start]
        } else {
            rev.seq[i]
        };
        merged.push(base);
    }

    String::from_utf8(merged).map_err(|_| ToolError::InvalidBase {
        read: rev.name.clone(),
        base: char::REPLACEMENT_CHARACTER,
    })
}
