//! Digital Signal Processing
//!
//! Pure functions for signal processing. No I/O dependencies, and no
//! function mutates a caller-owned buffer.

pub mod correlation;
pub mod fft;
pub mod lstsq;
pub mod metrics;
pub mod sinc;
pub mod spline;

// Re-export commonly used items
pub use correlation::Correlator;
pub use fft::FftProcessor;
pub use sinc::SincResampler;
pub use spline::CubicSpline;

/// Circular rotation: `out[n] = x[(n - shift) mod N]`, negative shifts rotate left
pub fn roll<T: Clone>(x: &[T], shift: isize) -> Vec<T> {
    let mut rotated = x.to_vec();
    if !rotated.is_empty() {
        let k = shift.rem_euclid(rotated.len() as isize) as usize;
        rotated.rotate_right(k);
    }
    rotated
}

/// Index of the first maximum of `score` over `values`
pub(crate) fn argmax_by<T>(values: &[T], score: impl Fn(&T) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, value) in values.iter().enumerate() {
        let s = score(value);
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if !(s > top) => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}
