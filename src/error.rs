//! Error type of the crate
use thiserror::Error;

/// Errors raised while configuring or running a simulation
#[derive(Error, Debug)]
pub enum Error {
    /// One or more input parameters are missing or invalid.
    /// Holds every message, not only the first.
    #[error("invalid input parameters: {}", .0.join("; "))]
    InvalidParameters(Vec<String>),

    /// Array does not have the expected shape
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Supplied shape
        got: Vec<usize>,
    },

    /// Spectral operation requested on a field without operators
    #[error("field `{0}` was constructed without spectral operators")]
    NoOperators(String),

    /// Co-evolved derivative histories disagree on their rotation index
    #[error("derivative histories out of sync, indices {0:?}")]
    HistoryDesync(Vec<usize>),

    /// Rotation index outside of the history buffer
    #[error("history index {idx} out of range for capacity {capacity}")]
    HistoryIndex {
        /// Requested index
        idx: usize,
        /// Number of stored evaluations
        capacity: usize,
    },

    /// Error from the hdf5 library
    #[error(transparent)]
    Hdf5(#[from] hdf5::Error),

    /// Dataset could not be converted to the requested dimensionality
    #[error(transparent)]
    Dimension(#[from] ndarray::ShapeError),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Returns `ShapeMismatch` unless both shapes agree
pub(crate) fn check_shape(expected: &[usize], got: &[usize]) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        })
    }
}
