use crate::error::ToolError;

/// Row-major one-hot tensor: `n_seqs x seq_len x alphabet_len`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    pub n_seqs: usize,
    pub seq_len: usize,
    pub alphabet_len: usize,
    pub data: Vec<f32>,
}

impl EncodedBatch {
    pub fn features_per_seq(&self) -> usize {
        self.seq_len * self.alphabet_len
    }

    pub fn row(&self, i: usize) -> &[f32] {
        let width = self.features_per_seq();
        &self.data[i * width..(i + 1) * width]
    }
}

#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    alphabet: Vec<char>,
}

impl OneHotEncoder {
    pub fn new(alphabet: &str) -> Self {
        Self {
            alphabet: alphabet.chars().collect(),
        }
    }

    pub fn encode<S: AsRef<str>>(&self, seqs: &[S]) -> Result<EncodedBatch, ToolError> {
        let seq_len = seqs.first().map(|s| s.as_ref().chars().count()).unwrap_or(0);
        let width = seq_len * self.alphabet.len();
        let mut data = vec![0.0f32; seqs.len() * width];

        for (index, seq) in seqs.iter().enumerate() {
            let seq = seq.as_ref();
            let len = seq.chars().count();
            if len != seq_len {
                return Err(ToolError::RaggedBatch {
                    index,
                    len,
                    expected: seq_len,
                });
            }
            for (pos, residue) in seq.chars().enumerate() {
                let column = self
                    .alphabet
                    .iter()
                    .position(|&aa| aa == residue)
                    .ok_or(ToolError::UnknownResidue { residue, pos })?;
                data[index * width + pos * self.alphabet.len() + column] = 1.0;
            }
        }

        Ok(EncodedBatch {
            n_seqs: seqs.len(),
            seq_len,
            alphabet_len: self.alphabet.len(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hot_layout() {
        let enc = OneHotEncoder::new("ACG");
        let batch = enc.encode(&["AG", "CC"]).unwrap();
        assert_eq!(batch.n_seqs, 2);
        assert_eq!(batch.row(0), [1.0f32, 0.0, 0.0, 0.0, 0.0, 1.0].as_slice());
        assert_eq!(batch.row(1), [0.0f32, 1.0, 0.0, 0.0, 1.0, 0.0].as_slice());
    }

    #[test]
    fn rejects_unknown_residue() {
        let enc = OneHotEncoder::new("ACG");
        let err = enc.encode(&["AX"]).unwrap_err();
        assert!(matches!(err, ToolError::UnknownResidue { residue: 'X', pos: 1 }));
    }

    #[test]
    fn rejects_ragged_batch() {
        let enc = OneHotEncoder::new("ACG");
        assert!(matches!(
            enc.encode(&["AC", "A"]),
            Err(ToolError::RaggedBatch { index: 1, .. })
        ));
    }
}
