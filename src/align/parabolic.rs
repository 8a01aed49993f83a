//! Parabolic curve fit (PCF) of the correlation peak
//!
//! Fits a parabola through the squared correlation magnitude at lags -1, 0
//! and +1 and takes its vertex as the fractional delay, then removes it
//! with a ±128-tap sinc kernel. Repeated a fixed number of times.

use crate::domain::{AlignConfig, DpdResult, Sample};
use crate::dsp::{roll, SincResampler};

use super::FineAlignment;

#[derive(Debug, Clone)]
pub struct ParabolicRefiner {
    iterations: usize,
    resampler: SincResampler,
}

/// `Σ conj(x[n]) · y[(n - lag) mod N]`
fn lagged_inner(x: &[Sample], y: &[Sample], lag: isize) -> Sample {
    let n = y.len() as isize;
    x.iter()
        .enumerate()
        .map(|(i, a)| a.conj() * y[(i as isize - lag).rem_euclid(n) as usize])
        .sum()
}

impl ParabolicRefiner {
    pub fn new(config: &AlignConfig) -> Self {
        Self {
            iterations: config.pcf_iterations,
            resampler: SincResampler::new(config.pcf_kernel_half_width),
        }
    }

    /// Vertex of the parabola: how far `y` should be advanced to match `x`
    ///
    /// Returns `0.0` when the three points do not define a parabola.
    pub fn estimate(&self, x: &[Sample], y: &[Sample]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let centre = lagged_inner(x, y, 0).norm_sqr();
        let left = lagged_inner(x, y, 1).norm_sqr();
        let right = lagged_inner(x, y, -1).norm_sqr();

        let vertex = 0.5 * (left - right) / (left + right - 2.0 * centre);
        if vertex.is_finite() {
            vertex
        } else {
            log::warn!("PCF: degenerate parabola, treating delay as zero");
            0.0
        }
    }
}

impl FineAlignment for ParabolicRefiner {
    fn refine(&self, x: &[Sample], ycir: &[Sample]) -> DpdResult<Vec<Sample>> {
        let mut aligned = ycir.to_vec();
        for iteration in 0..self.iterations {
            let mut advance = self.estimate(x, &aligned);
            if advance.abs() > 0.5 {
                let whole = advance.round();
                aligned = roll(&aligned, -(whole as isize));
                advance -= whole;
            }
            log::debug!("PCF iteration {}: fractional delay {advance:.4}", iteration + 1);
            aligned = self.resampler.fractional(&aligned, -advance);
        }
        Ok(aligned)
    }
}
