use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindowError {
    #[error("overlap {overlap} must be strictly less than target_size {target_size}")]
    InvalidOverlap { overlap: usize, target_size: usize },

    #[error("overlap {overlap} exceeds current window size {size}")]
    OverlapExceedsSize { overlap: usize, size: usize },

    #[error("a non-zero overlap ({overlap}) was requested on the last window of its chromosome")]
    OverlapOnLastWindow { overlap: usize },

    #[error("restricted window advanced over {0} reference markers but matched zero source records")]
    NoCommonMarkers(usize),
}
