use thiserror::Error;

/// Domain failures. I/O and parse errors travel as `anyhow::Error` with context.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("read {read}: unexpected base '{base}' (expected one of A, C, G, T, N)")]
    InvalidBase { read: String, base: char },

    #[error("read {read}: {what} has {len} characters, merge layout needs at least {needed}")]
    ReadTooShort {
        read: String,
        what: &'static str,
        len: usize,
        needed: usize,
    },

    #[error("invalid merge layout: {0}")]
    InvalidLayout(String),

    #[error("reference table is missing required column '{0}'")]
    MissingColumn(String),

    #[error("count column '{column}' has {got} values but the table has {expected} rows")]
    CountLengthMismatch {
        column: String,
        got: usize,
        expected: usize,
    },

    #[error("invalid mutation '{0}'")]
    InvalidMutation(String),

    #[error("wild-type mismatch at position {pos}: expected '{expected}', found '{found}'")]
    WildTypeMismatch {
        pos: usize,
        expected: char,
        found: char,
    },

    #[error("residue '{residue}' at position {pos} is not in the alphabet")]
    UnknownResidue { residue: char, pos: usize },

    #[error("sequence {index} has length {len}, batch length is {expected}")]
    RaggedBatch {
        index: usize,
        len: usize,
        expected: usize,
    },

    #[error("wild-type counts must be positive (unselected {unsel}, selected {sel})")]
    NonPositiveWildType { unsel: f64, sel: f64 },
}
