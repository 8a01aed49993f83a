//! GMP model evaluation: `y = X(x) · coef`

use nalgebra::DVector;

use crate::domain::{DpdError, DpdResult, GmpConfig, Sample};

use super::basis::GmpBasisBuilder;
use super::GmpCoefficients;

#[derive(Debug, Clone)]
pub struct GmpEvaluator {
    builder: GmpBasisBuilder,
}

impl GmpEvaluator {
    pub fn new(config: &GmpConfig) -> DpdResult<Self> {
        Ok(Self {
            builder: GmpBasisBuilder::new(config)?,
        })
    }

    /// Predict the model output for the whole of `x`
    pub fn evaluate(
        &self,
        x: &[Sample],
        coefficients: &GmpCoefficients,
    ) -> DpdResult<Vec<Sample>> {
        if coefficients.len() != self.builder.columns() {
            return Err(DpdError::mismatch(
                "GMP coefficients",
                self.builder.columns(),
                coefficients.len(),
            ));
        }
        let basis = self.builder.build(x)?;
        let weights = DVector::from_column_slice(coefficients.as_slice());
        let y = basis.matrix() * weights;
        Ok(y.iter().copied().collect())
    }
}

/// Evaluate coefficients extracted with the same `config`
pub fn evaluate(
    x: &[Sample],
    coefficients: &GmpCoefficients,
    config: &GmpConfig,
) -> DpdResult<Vec<Sample>> {
    GmpEvaluator::new(config)?.evaluate(x, coefficients)
}
