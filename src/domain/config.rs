//! Configuration for the alignment and GMP stages
//!
//! Plain serde structs with sensible defaults. The core never reads them
//! from disk; the DPD control loop owns persistence.

use serde::{Deserialize, Serialize};

use super::error::{DpdError, DpdResult};

/// Tuning knobs for the fine-alignment strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Number of spline refinement passes
    pub spline_passes: usize,
    /// Half-width (in lags) of the correlation window the spline is fitted to
    pub spline_window: usize,
    /// Points in the dense evaluation grid
    pub spline_grid_points: usize,
    /// The dense grid spans [-span, span] lags
    pub spline_grid_span: f64,
    /// Half-width of the sinc kernel applied after each spline pass
    pub spline_kernel_half_width: usize,
    /// Number of parabolic-fit iterations
    pub pcf_iterations: usize,
    /// Half-width of the sinc kernel used by the parabolic fit
    pub pcf_kernel_half_width: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            spline_passes: 3,
            spline_window: 16,
            spline_grid_points: 1000,
            spline_grid_span: 32.0,
            spline_kernel_half_width: 200,
            pcf_iterations: 6,
            pcf_kernel_half_width: 128,
        }
    }
}

/// What to do with non-finite basis entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NanPolicy {
    /// Replace with zero, count and log a warning
    #[default]
    Zero,
    /// Fail with `NumericDegeneracy`
    Reject,
}

fn default_ratio() -> f64 {
    1.0
}

fn default_regularization() -> f64 {
    1e-6
}

/// Generalized Memory Polynomial model orders
///
/// `nonlinear_order = [Ka, Kb, Kc]`, `lagging_depth = [La, Lb, Lc]`,
/// `memory_depth = [Mb, Mc]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GmpConfig {
    pub nonlinear_order: [usize; 3],
    pub lagging_depth: [usize; 3],
    pub memory_depth: [usize; 2],
    /// Leading fraction of the record used for extraction, in (0, 1]
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    /// Tikhonov term added to the Gram matrix diagonal
    #[serde(default = "default_regularization")]
    pub regularization: f64,
    #[serde(default)]
    pub nan_policy: NanPolicy,
}

impl GmpConfig {
    pub fn new(
        nonlinear_order: [usize; 3],
        lagging_depth: [usize; 3],
        memory_depth: [usize; 2],
    ) -> Self {
        Self {
            nonlinear_order,
            lagging_depth,
            memory_depth,
            ratio: default_ratio(),
            regularization: default_regularization(),
            nan_policy: NanPolicy::default(),
        }
    }

    /// Classic memory polynomial: only the aligned block, `K` orders by `M` taps
    pub fn memory_polynomial(nonlinear_order: usize, memory_depth: usize) -> Self {
        Self::new([nonlinear_order, 0, 0], [memory_depth, 0, 0], [0, 0])
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_nan_policy(mut self, nan_policy: NanPolicy) -> Self {
        self.nan_policy = nan_policy;
        self
    }

    /// Number of columns `P = Ka·La + Kb·Lb·Mb + Kc·Lc·Mc`
    pub fn basis_len(&self) -> usize {
        let [ka, kb, kc] = self.nonlinear_order;
        let [la, lb, lc] = self.lagging_depth;
        let [mb, mc] = self.memory_depth;
        ka * la + kb * lb * mb + kc * lc * mc
    }

    /// Number of samples used for extraction out of a record of `len`
    pub fn extraction_len(&self, len: usize) -> usize {
        (self.ratio * len as f64).floor() as usize
    }

    pub fn validate(&self) -> DpdResult<()> {
        let [ka, _, _] = self.nonlinear_order;
        let [la, _, _] = self.lagging_depth;
        if ka == 0 || la == 0 {
            return Err(DpdError::InvalidArgument(format!(
                "aligned block needs Ka >= 1 and La >= 1 (got Ka={ka}, La={la})"
            )));
        }
        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            return Err(DpdError::InvalidArgument(format!(
                "extraction ratio must lie in (0, 1], got {}",
                self.ratio
            )));
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(DpdError::InvalidArgument(format!(
                "regularization must be finite and non-negative, got {}",
                self.regularization
            )));
        }
        Ok(())
    }
}

impl Default for GmpConfig {
    fn default() -> Self {
        Self::new([7, 3, 3], [3, 2, 2], [1, 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_align_config_matches_reference_constants() {
        let config = AlignConfig::default();
        assert_eq!(config.spline_passes, 3);
        assert_eq!(config.spline_window, 16);
        assert_eq!(config.spline_grid_points, 1000);
        assert_eq!(config.spline_kernel_half_width, 200);
        assert_eq!(config.pcf_iterations, 6);
        assert_eq!(config.pcf_kernel_half_width, 128);
    }

    #[test]
    fn basis_len_counts_all_three_blocks() {
        let config = GmpConfig::new([5, 3, 2], [4, 2, 3], [2, 1]);
        assert_eq!(config.basis_len(), 5 * 4 + 3 * 2 * 2 + 2 * 3 * 1);
        assert_eq!(GmpConfig::memory_polynomial(7, 3).basis_len(), 21);
    }

    #[test]
    fn validate_rejects_empty_aligned_block() {
        assert!(GmpConfig::new([0, 1, 1], [1, 1, 1], [1, 1]).validate().is_err());
        assert!(GmpConfig::new([3, 1, 1], [0, 1, 1], [1, 1]).validate().is_err());
        assert!(GmpConfig::new([3, 0, 0], [1, 0, 0], [0, 0]).validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_ratio_and_regularization() {
        let base = GmpConfig::default();
        assert!(base.clone().with_ratio(0.0).validate().is_err());
        assert!(base.clone().with_ratio(1.5).validate().is_err());
        assert!(base.clone().with_ratio(f64::NAN).validate().is_err());
        assert!(base.clone().with_regularization(-1e-6).validate().is_err());
        assert!(base.with_ratio(0.5).validate().is_ok());
    }

    #[test]
    fn extraction_len_truncates_toward_zero() {
        let config = GmpConfig::default().with_ratio(0.7);
        assert_eq!(config.extraction_len(10), 7);
        assert_eq!(config.extraction_len(3), 2);
    }

    #[test]
    fn gmp_config_deserializes_with_defaults() {
        let json = r#"{"nonlinear_order":[5,2,2],"lagging_depth":[3,2,2],"memory_depth":[1,1]}"#;
        let config: GmpConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.ratio, 1.0);
        assert_eq!(config.regularization, 1e-6);
        assert_eq!(config.nan_policy, NanPolicy::Zero);
    }

    #[test]
    fn align_config_serializes_to_json() {
        let json = serde_json::to_string(&AlignConfig::default()).unwrap();
        assert!(json.contains("\"spline_passes\":3"));
    }
}
