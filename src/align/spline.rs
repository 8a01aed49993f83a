//! Spline refinement of the envelope correlation peak
//!
//! Each pass correlates the envelopes around zero lag, fits a cubic spline
//! to the window, takes the peak of the spline as the residual delay and
//! removes it with sinc interpolation before the next pass.

use crate::domain::{AlignConfig, DpdResult, Sample};
use crate::dsp::{argmax_by, Correlator, CubicSpline, SincResampler};

use super::FineAlignment;

/// Relative spread below which the correlation window carries no delay information
const FLAT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct SplineRefiner {
    passes: usize,
    window: usize,
    grid_points: usize,
    grid_span: f64,
    resampler: SincResampler,
}

impl SplineRefiner {
    pub fn new(config: &AlignConfig) -> Self {
        Self {
            passes: config.spline_passes,
            window: config.spline_window,
            grid_points: config.spline_grid_points,
            grid_span: config.spline_grid_span,
            resampler: SincResampler::new(config.spline_kernel_half_width),
        }
    }

    /// Delay to apply to `y` so that its envelope lines up with `x`'s
    ///
    /// Both inputs are envelopes of equal length. The spline is fitted to a
    /// window centred on the strongest lag and may only move the estimate
    /// within one lag of it. A window too short for a spline, or one with
    /// no discernible peak, yields `0.0`.
    pub fn estimate(&self, x_env: &[f64], y_env: &[f64]) -> DpdResult<f64> {
        let xs: Vec<Sample> = x_env.iter().map(|&v| Sample::new(v, 0.0)).collect();
        let ys: Vec<Sample> = y_env.iter().map(|&v| Sample::new(v, 0.0)).collect();
        let corr = Correlator::centered(&xs, &ys)?;

        let n = corr.len();
        let magnitude: Vec<f64> = corr.iter().map(|c| c.norm()).collect();
        let Some(peak) = argmax_by(&magnitude, |&v| v) else {
            return Ok(0.0);
        };

        // Symmetric about the peak, wrapping circularly, never repeating a lag
        let half = self.window.min(n.saturating_sub(1) / 2);
        let values: Vec<f64> = (0..=2 * half)
            .map(|j| magnitude[(peak + n + j - half) % n])
            .collect();
        if values.len() < 4 {
            log::debug!("spline refinement skipped: only {} lags available", values.len());
            return Ok(0.0);
        }

        let top = values.iter().copied().fold(f64::MIN, f64::max);
        let bottom = values.iter().copied().fold(f64::MAX, f64::min);
        if top - bottom <= FLAT_TOLERANCE * top.abs() {
            log::debug!("spline refinement skipped: flat envelope correlation");
            return Ok(0.0);
        }

        let peak_lag = Correlator::centered_lag(peak, n) as f64;
        let (left, centre, right) = (values[half - 1], values[half], values[half + 1]);
        let spline = CubicSpline::uniform(peak_lag - half as f64, 1.0, values)?;

        // Short windows can leave the spline convex at the peak knot; the
        // three-point vertex is the only estimate then
        if spline.knot_curvature(half) >= 0.0 {
            let vertex = 0.5 * (left - right) / (left + right - 2.0 * centre);
            log::debug!("spline not concave at lag {peak_lag}, using three-point vertex");
            return Ok(if vertex.is_finite() {
                peak_lag + vertex.clamp(-1.0, 1.0)
            } else {
                peak_lag
            });
        }

        // Dense search, kept within one lag of the discrete peak
        let grid: Vec<f64> = (0..self.grid_points)
            .map(|i| {
                let frac = i as f64 / (self.grid_points.max(2) - 1) as f64;
                -self.grid_span + 2.0 * self.grid_span * frac
            })
            .filter(|l| (l - peak_lag).abs() <= 1.0)
            .collect();
        let guess = argmax_by(&grid, |&l| spline.eval(l))
            .map(|i| grid[i])
            .unwrap_or(peak_lag);

        let (lag, _) = spline.peak_near(guess);
        if (lag - peak_lag).abs() > 1.0 {
            return Ok(peak_lag);
        }
        Ok(lag)
    }
}

impl FineAlignment for SplineRefiner {
    fn refine(&self, x: &[Sample], ycir: &[Sample]) -> DpdResult<Vec<Sample>> {
        let x_env: Vec<f64> = x.iter().map(|v| v.norm()).collect();
        let mut aligned = ycir.to_vec();
        for pass in 0..self.passes {
            let y_env: Vec<f64> = aligned.iter().map(|v| v.norm()).collect();
            let lag = self.estimate(&x_env, &y_env)?;
            log::debug!("spline pass {}: residual delay {lag:.4} samples", pass + 1);
            aligned = self.resampler.shift(&aligned, lag);
        }
        Ok(aligned)
    }
}
