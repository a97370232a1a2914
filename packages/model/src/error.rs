use crate::path::Path;
use thiserror::Error;

/// Errors produced by the delta algebra
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeltaError {
    #[error("Length mismatch: patch consumes {required} characters but base provides {base}")]
    LengthMismatch { base: usize, required: usize },
}

/// Errors produced by tree queries and splices
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Invalid path: {0}")]
    InvalidPath(Path),

    #[error("Node at {0} does not carry text")]
    NotTextBearing(Path),

    #[error("Delta error: {0}")]
    Delta(#[from] DeltaError),
}
