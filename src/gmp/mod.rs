//! Generalized Memory Polynomial (GMP) behavioral model
//!
//! The model output is a weighted sum of three families of basis terms:
//! - aligned: `x[n-l] · |x[n-l]|^k`
//! - lagging: `x[n-l] · |x[n-l-m-1]|^(k+1)`, envelope sampled later
//! - leading: `x[n-l] · |x[n-l+m+1]|^(k+1)`, envelope sampled earlier
//!
//! Delays are circular over the record. Extraction and evaluation share
//! one column enumeration, so coefficients from [`GmpExtractor`] are only
//! meaningful to a [`GmpEvaluator`] built from the same [`GmpConfig`].
//!
//! [`GmpConfig`]: crate::domain::GmpConfig

pub mod basis;
pub mod evaluate;
pub mod extract;

pub use basis::{basis_terms, BasisMatrix, BasisTerm, Block, GmpBasisBuilder};
pub use evaluate::{evaluate, GmpEvaluator};
pub use extract::{extract, GmpExtractor};

use serde::{Deserialize, Serialize};

use crate::domain::Sample;

/// Model weights, one per basis column, in enumeration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GmpCoefficients(Vec<Sample>);

impl GmpCoefficients {
    pub fn new(values: Vec<Sample>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.0.iter()
    }
}

impl From<Vec<Sample>> for GmpCoefficients {
    fn from(values: Vec<Sample>) -> Self {
        Self(values)
    }
}
