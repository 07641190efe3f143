use crate::ngs::record::FastqRecord;
use anyhow::{Context, Result};
use niffler::get_reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Walks an R1/R2 file pair in lock step and yields one record pair at a time.
///
/// Records are delimited by a line starting with `@` in *both* files. The
/// final pair has no following header and is flushed when either file ends.
pub struct PairedFastqReader {
    fwd: Box<dyn BufRead>,
    rev: Box<dyn BufRead>,
    fwd_block: Vec<String>,
    rev_block: Vec<String>,
    finished: bool,
}

fn open_maybe_compressed(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let (inner_reader, _compression) = get_reader(Box::new(file))
        .with_context(|| format!("Failed to detect compression of {}", path.display()))?;
    Ok(Box::new(BufReader::with_capacity(1024 * 1024, inner_reader)))
}

impl PairedFastqReader {
    pub fn open(r1: &Path, r2: &Path) -> Result<Self> {
        Ok(Self::from_readers(
            open_maybe_compressed(r1)?,
            open_maybe_compressed(r2)?,
        ))
    }

    pub fn from_readers(fwd: Box<dyn BufRead>, rev: Box<dyn BufRead>) -> Self {
        Self {
            fwd,
            rev,
            fwd_block: Vec::with_capacity(4),
            rev_block: Vec::with_capacity(4),
            finished: false,
        }
    }

    /// Convenience for in-memory input.
    pub fn from_bytes<R: Read + 'static>(fwd: R, rev: R) -> Self {
        Self::from_readers(Box::new(BufReader::new(fwd)), Box::new(BufReader::new(rev)))
    }

    fn take_pair(&mut self) -> (FastqRecord, FastqRecord) {
        let fwd = FastqRecord::from_lines(&self.fwd_block);
        let rev = FastqRecord::from_lines(&self.rev_block);
        self.fwd_block.clear();
        self.rev_block.clear();
        (fwd, rev)
    }

    pub fn next_pair(&mut self) -> Result<Option<(FastqRecord, FastqRecord)>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            let mut l1 = String::new();
            let mut l2 = String::new();
            let n1 = self.fwd.read_line(&mut l1).context("Failed to read forward reads")?;
            let n2 = self.rev.read_line(&mut l2).context("Failed to read reverse reads")?;

            if n1 == 0 || n2 == 0 {
                self.finished = true;
                if self.fwd_block.is_empty() && self.rev_block.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.take_pair()));
            }

            let boundary = l1.starts_with('@')
                && l2.starts_with('@')
                && !self.fwd_block.is_empty()
                && !self.rev_block.is_empty();

            if boundary {
                let pair = self.take_pair();
                self.fwd_block.push(l1);
                self.rev_block.push(l2);
                return Ok(Some(pair));
            }

            self.fwd_block.push(l1);
            self.rev_block.push(l2);
        }
    }
}

impl Iterator for PairedFastqReader {
    type Item = Result<(FastqRecord, FastqRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_pair().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(fwd: &str, rev: &str) -> PairedFastqReader {
        PairedFastqReader::from_bytes(Cursor::new(fwd.as_bytes().to_vec()), Cursor::new(rev.as_bytes().to_vec()))
    }

    #[test]
    fn yields_every_pair_including_last() {
        let fwd = "@a/1\nAC\n+\nII\n@b/1\nGT\n+\n##\n";
        let rev = "@a/2\nTT\n+\nII\n@b/2\nCC\n+\nII\n";
        let pairs: Vec<_> = reader(fwd, rev).collect::<Result<_>>().unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.id(), "a/1");
        assert_eq!(pairs[0].1.seq, b"TT");
        assert_eq!(pairs[1].0.seq, b"GT");
        assert_eq!(pairs[1].0.qual, b"##");
    }

    #[test]
    fn last_record_without_trailing_newline() {
        let pairs: Vec<_> = reader("@a\nAC\n+\nII", "@a\nGG\n+\nII")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.qual, b"II");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(reader("", "").count(), 0);
    }

    #[test]
    fn stops_at_shorter_file() {
        let fwd = "@a\nAC\n+\nII\n@b\nGT\n+\nII\n";
        let rev = "@a\nTT\n+\nII\n";
        let pairs: Vec<_> = reader(fwd, rev).collect::<Result<_>>().unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn header_in_one_file_only_is_not_a_boundary() {
        // Quality line of the first R1 record starts with '@'.
        let fwd = "@a\nAC\n+\n@I\n@b\nGT\n+\nII\n";
        let rev = "@a\nTT\n+\nII\n@b\nCC\n+\nII\n";
        let pairs: Vec<_> = reader(fwd, rev).collect::<Result<_>>().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.qual, b"@I");
    }
}
