//! Time alignment of a captured PA output against its reference
//!
//! Pipeline: truncate → coarse (integer) alignment → fine (sub-sample)
//! alignment → phase synchronization → RMS normalization.
//!
//! The fine stage is one of three interchangeable strategies selected by
//! [`AlignmentMethod`]:
//! - `Spline`: cubic spline peak of the envelope correlation, 3 passes
//! - `PCF`: parabolic fit of the correlation peak, 6 iterations
//! - `LS`: one-shot two-tap least-squares interpolator

pub mod coarse;
pub mod least_squares;
pub mod parabolic;
pub mod spline;

pub use coarse::{coarse_align, coarse_lag};
pub use least_squares::LeastSquaresRefiner;
pub use parabolic::ParabolicRefiner;
pub use spline::SplineRefiner;

use crate::domain::{AlignConfig, AlignmentMethod, DpdError, DpdResult, Sample};
use crate::dsp::metrics::rms;

/// Sub-sample delay correction applied after coarse alignment
pub trait FineAlignment {
    /// Return a copy of `ycir` with its residual delay relative to `x` removed
    fn refine(&self, x: &[Sample], ycir: &[Sample]) -> DpdResult<Vec<Sample>>;
}

/// Aligns captured signals to a reference with a fixed strategy
#[derive(Debug, Clone)]
pub struct Aligner {
    method: AlignmentMethod,
    config: AlignConfig,
}

impl Aligner {
    pub fn new(method: AlignmentMethod) -> Self {
        Self {
            method,
            config: AlignConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AlignConfig) -> Self {
        self.config = config;
        self
    }

    pub fn method(&self) -> AlignmentMethod {
        self.method
    }

    fn refiner(&self) -> Box<dyn FineAlignment> {
        match self.method {
            AlignmentMethod::Spline => Box::new(SplineRefiner::new(&self.config)),
            AlignmentMethod::Pcf => Box::new(ParabolicRefiner::new(&self.config)),
            AlignmentMethod::Ls => Box::new(LeastSquaresRefiner::new()),
        }
    }

    /// Align `y` to `x`, returning a new buffer of `len(x)` samples
    ///
    /// `y` may be longer than `x`; the excess tail is ignored.
    pub fn align(&self, x: &[Sample], y: &[Sample]) -> DpdResult<Vec<Sample>> {
        if x.is_empty() {
            return Err(DpdError::InvalidArgument(
                "reference signal is empty".to_string(),
            ));
        }
        if y.len() < x.len() {
            return Err(DpdError::mismatch("captured signal", x.len(), y.len()));
        }
        let y = &y[..x.len()];

        let ycir = coarse_align(x, y)?;
        let ycir = self.refiner().refine(x, &ycir)?;
        let ycir = phase_sync(x, &ycir)?;
        normalize_rms(x, &ycir)
    }
}

/// Align `y` to `x` with the default tuning for `method`
pub fn align(x: &[Sample], y: &[Sample], method: AlignmentMethod) -> DpdResult<Vec<Sample>> {
    Aligner::new(method).align(x, y)
}

/// Scale `y` by the mean complex ratio `x / y`
///
/// One scalar for the whole record: corrects the average phase and gain
/// offset, not per-sample variation. Samples where `y` is exactly zero are
/// left out of the mean.
pub fn phase_sync(x: &[Sample], y: &[Sample]) -> DpdResult<Vec<Sample>> {
    let (sum, count) = x
        .iter()
        .zip(y)
        .filter(|(_, b)| b.norm_sqr() > 0.0)
        .fold((Sample::new(0.0, 0.0), 0usize), |(sum, count), (a, b)| {
            (sum + a / b, count + 1)
        });
    if count == 0 {
        return Err(DpdError::NumericDegeneracy(
            "aligned signal has zero energy".to_string(),
        ));
    }

    let correction = sum / count as f64;
    if !(correction.re.is_finite() && correction.im.is_finite()) {
        return Err(DpdError::NumericDegeneracy(format!(
            "phase correction is not finite: {correction}"
        )));
    }
    log::debug!(
        "phase sync: gain {:.4}, phase {:.4} rad",
        correction.norm(),
        correction.arg()
    );
    Ok(y.iter().map(|v| v * correction).collect())
}

/// Scale `y` so its RMS equals that of `x`
pub fn normalize_rms(x: &[Sample], y: &[Sample]) -> DpdResult<Vec<Sample>> {
    let level = rms(y);
    if level == 0.0 || !level.is_finite() {
        return Err(DpdError::NumericDegeneracy(format!(
            "cannot normalize a signal with RMS {level}"
        )));
    }
    let scale = rms(x) / level;
    Ok(y.iter().map(|v| v * scale).collect())
}
