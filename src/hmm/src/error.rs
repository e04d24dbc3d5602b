use thiserror::Error;

pub use crate::node_table::NodeTableError;

#[derive(Error, Debug)]
pub enum HmmError {
    #[error("node-tuple table error: {0}")]
    NodeTable(#[from] NodeTableError),

    #[error("level has no live states at marker {0}")]
    NoLiveStates(usize),

    #[error("spliced GL prefix markers do not match the base GL's initial markers")]
    SplicedPrefixMismatch,

    #[error("spliced GL prefix sample count {prefix} does not match base sample count {base}")]
    SplicedSampleMismatch { prefix: usize, base: usize },

    #[error("posterior accumulator has length {actual}, expected {expected}")]
    PosteriorLengthMismatch { expected: usize, actual: usize },

    #[error("sample index {0} is out of range for the posterior accumulator")]
    SampleOutOfRange(usize),
}
