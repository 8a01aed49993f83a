//! Integer-sample alignment by correlation peak
//!
//! Correlating `y` against two back-to-back copies of `x` covers every
//! circular lag in one linear pass.

use crate::domain::{DpdError, DpdResult, Sample};
use crate::dsp::{argmax_by, roll, Correlator};

/// Circular rotation (in `0..=N`) that best lines `y` up with `x`
pub fn coarse_lag(x: &[Sample], y: &[Sample]) -> DpdResult<usize> {
    if x.len() != y.len() {
        return Err(DpdError::mismatch("coarse alignment", x.len(), y.len()));
    }
    let doubled = [x, x].concat();
    let corr = Correlator::linear(&doubled, y)?;
    argmax_by(&corr, |c| c.norm()).ok_or_else(|| {
        DpdError::NumericDegeneracy("correlation has no finite peak".to_string())
    })
}

/// Rotate `y` by the coarse lag
pub fn coarse_align(x: &[Sample], y: &[Sample]) -> DpdResult<Vec<Sample>> {
    let lag = coarse_lag(x, y)?;
    log::debug!("coarse alignment: rotating by {lag} samples");
    Ok(roll(y, lag as isize))
}
