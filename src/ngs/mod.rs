//! Paired-end read merging and exact variant counting.

pub mod counter;
pub mod merge;
pub mod pairing;
pub mod pipeline;
pub mod reader;
pub mod record;

pub use counter::{CountWindow, VariantCounts, VariantTable};
pub use merge::{merge_read_pair, MergeLayout};
pub use pairing::{CountNaming, SamplePair};
pub use pipeline::{run_preprocessing, PairSource, PreprocessOptions};
pub use reader::PairedFastqReader;
pub use record::FastqRecord;
