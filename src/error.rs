//! The [`RegionsError`] `enum` definition and error messages.
//!
use crate::PositionOffset;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// The [`RegionsError`] defines the standard set of errors that should
/// be passed to the user.
#[derive(Debug, Error)]
pub enum RegionsError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("File does not exist: {0}")]
    FileNotFound(PathBuf),

    // Record parsing related errors
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("BED-like line is malformed. The first three columns must be sequence name, start, and end.\nLine: {0}")]
    MalformedRecord(String),
    #[error("Invalid strand '{0}': must be either '+', '-', or '.'")]
    InvalidStrand(String),

    // Invalid region errors
    #[error("Region invalid: end ({1}) must be greater than start ({0})")]
    InvalidRegion(PositionOffset, PositionOffset),

    // Invalid argument errors
    #[error("Sample size ({0}) exceeds the number of regions ({1})")]
    SampleSizeExceedsLength(usize, usize),
    #[error("Unknown intersection mode '{0}': must be 'overlap', 'original', or 'comp-incl'")]
    UnknownIntersectMode(String),
    #[error("Unknown backend '{0}': must be 'linear' or 'tree'")]
    UnknownBackend(String),

    // Cross-backend operation errors
    #[error("Both region sets must use the same backend")]
    MismatchedImplementation,
}
