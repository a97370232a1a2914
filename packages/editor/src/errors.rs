//! Error types for the editor

use doctree_model::{DeltaError, Path, TreeError};
use thiserror::Error;

/// Why a transaction was rejected. Any of these aborts the whole
/// transaction; the live tree is never partially mutated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    #[error("Invalid path: {0}")]
    InvalidPath(Path),

    #[error("Length mismatch: {0}")]
    LengthMismatch(#[from] DeltaError),

    #[error("Invalid operation #{index} ({kind}) at {path}: {reason}")]
    InvalidOperation {
        index: usize,
        kind: &'static str,
        path: Path,
        reason: String,
    },

    #[error("Structural invariant violation: {0}")]
    StructuralInvariantViolation(String),
}

impl From<TreeError> for TransactionError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::InvalidPath(path) => TransactionError::InvalidPath(path),
            TreeError::Delta(delta) => TransactionError::LengthMismatch(delta),
            TreeError::NotTextBearing(path) => TransactionError::InvalidOperation {
                index: 0,
                kind: "update_text",
                path,
                reason: "node does not carry text".to_string(),
            },
        }
    }
}
