//! One-shot two-tap least-squares interpolator
//!
//! Models the aligned signal as `t0·y[n] + t1·y[n-1]` and fits the taps to
//! `x` through the normal equations. No iteration: this is a linear
//! approximation of a sub-sample delay plus complex gain.

use nalgebra::{DMatrix, DVector};

use crate::domain::{DpdResult, Sample};
use crate::dsp::lstsq;

use super::FineAlignment;

#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquaresRefiner;

/// `y` delayed by one sample, zero-filled at the start
fn delayed(y: &[Sample]) -> Vec<Sample> {
    let mut out = Vec::with_capacity(y.len());
    if !y.is_empty() {
        out.push(Sample::new(0.0, 0.0));
        out.extend_from_slice(&y[..y.len() - 1]);
    }
    out
}

impl LeastSquaresRefiner {
    pub fn new() -> Self {
        Self
    }

    /// Taps `[t0, t1]` minimizing `‖x - (t0·y[n] + t1·y[n-1])‖²`
    pub fn taps(&self, x: &[Sample], y: &[Sample]) -> DpdResult<[Sample; 2]> {
        let previous = delayed(y);
        let design = DMatrix::from_fn(y.len(), 2, |row, col| {
            if col == 0 {
                y[row]
            } else {
                previous[row]
            }
        });
        let target = DVector::from_column_slice(x);
        let taps = lstsq::regularized_solve(&design, &target, 0.0)?;
        Ok([taps[0], taps[1]])
    }
}

impl FineAlignment for LeastSquaresRefiner {
    fn refine(&self, x: &[Sample], ycir: &[Sample]) -> DpdResult<Vec<Sample>> {
        let [current, previous] = self.taps(x, ycir)?;
        log::debug!("LS taps: {current:.4}, {previous:.4}");
        Ok(ycir
            .iter()
            .zip(delayed(ycir))
            .map(|(&y, y_prev)| current * y + previous * y_prev)
            .collect())
    }
}
