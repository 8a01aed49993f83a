//! Domain error types

use thiserror::Error;

/// Errors that can occur in the alignment and modelling core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DpdError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}

impl DpdError {
    pub(crate) fn mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            actual,
        }
    }
}

/// Result type alias for DPD core operations
pub type DpdResult<T> = Result<T, DpdError>;
