//! GMP coefficient extraction
//!
//! `coef = pinv(XᴴX + εI) · Xᴴ · y` over the leading `ratio` fraction of
//! the record. The Tikhonov term keeps the solve well posed when the basis
//! is rank deficient (duplicate columns, constant-envelope input).

use nalgebra::DVector;

use crate::domain::{DpdError, DpdResult, GmpConfig, Sample};
use crate::dsp::lstsq;

use super::basis::GmpBasisBuilder;
use super::GmpCoefficients;

#[derive(Debug, Clone)]
pub struct GmpExtractor {
    builder: GmpBasisBuilder,
    config: GmpConfig,
}

impl GmpExtractor {
    pub fn new(config: &GmpConfig) -> DpdResult<Self> {
        Ok(Self {
            builder: GmpBasisBuilder::new(config)?,
            config: config.clone(),
        })
    }

    /// Fit coefficients mapping `x_target` onto `y_target`
    pub fn extract(
        &self,
        x_target: &[Sample],
        y_target: &[Sample],
    ) -> DpdResult<GmpCoefficients> {
        if x_target.len() != y_target.len() {
            return Err(DpdError::mismatch("extraction output", x_target.len(), y_target.len()));
        }
        let n = self.config.extraction_len(x_target.len());
        if n == 0 {
            return Err(DpdError::InvalidArgument(format!(
                "extraction ratio {} leaves no samples out of {}",
                self.config.ratio,
                x_target.len()
            )));
        }

        let basis = self.builder.build(&x_target[..n])?;
        let target = DVector::from_column_slice(&y_target[..n]);
        let epsilon = self.config.regularization;
        let coef = lstsq::regularized_solve(basis.matrix(), &target, epsilon)?;

        log::debug!(
            "GMP extraction: {} coefficients from {n} samples (eps = {epsilon:e})",
            coef.len()
        );
        Ok(GmpCoefficients::new(coef.iter().copied().collect()))
    }
}

/// Extract coefficients for `config` in one call
pub fn extract(
    x_target: &[Sample],
    y_target: &[Sample],
    config: &GmpConfig,
) -> DpdResult<GmpCoefficients> {
    GmpExtractor::new(config)?.extract(x_target, y_target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                Sample::new(0.6 * (t * 0.37).sin(), 0.5 * (t * 0.11 + 0.3).cos())
            })
            .collect()
    }

    #[test]
    fn recovers_linear_gain() {
        let x = input(200);
        let gain = Sample::new(0.9, -0.3);
        let y: Vec<Sample> = x.iter().map(|v| v * gain).collect();
        let coef = extract(&x, &y, &GmpConfig::memory_polynomial(1, 1)).unwrap();
        assert_eq!(coef.len(), 1);
        assert!((coef.as_slice()[0] - gain).norm() < 1e-4, "got {}", coef.as_slice()[0]);
    }

    #[test]
    fn only_leading_fraction_is_fitted() {
        let x = input(100);
        let mut y: Vec<Sample> = x.iter().map(|v| v * 2.0).collect();
        // Garbage past the extraction window must not influence the fit
        for v in y.iter_mut().skip(50) {
            *v = Sample::new(100.0, -100.0);
        }
        let config = GmpConfig::memory_polynomial(1, 1).with_ratio(0.5);
        let coef = extract(&x, &y, &config).unwrap();
        assert!((coef.as_slice()[0] - Sample::new(2.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn extraction_window_rounds_down() {
        // 0.5 · 11 = 5.5, so only rows 0..5 take part
        let x = input(11);
        let mut y: Vec<Sample> = x.iter().map(|v| v * Sample::new(0.0, 1.5)).collect();
        y[5] = Sample::new(-50.0, 50.0);
        let config = GmpConfig::memory_polynomial(1, 1).with_ratio(0.5);
        assert_eq!(config.extraction_len(x.len()), 5);

        let coef = extract(&x, &y, &config).unwrap();
        assert!((coef.as_slice()[0] - Sample::new(0.0, 1.5)).norm() < 1e-4);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let x = input(10);
        let err = extract(&x, &x[..9], &GmpConfig::default()).unwrap_err();
        assert!(matches!(err, DpdError::DimensionMismatch { .. }));
    }

    #[test]
    fn tiny_ratio_leaving_no_samples_is_rejected() {
        let x = input(3);
        let config = GmpConfig::memory_polynomial(1, 1).with_ratio(0.2);
        assert!(matches!(extract(&x, &x, &config), Err(DpdError::InvalidArgument(_))));
    }
}
