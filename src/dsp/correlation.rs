//! Cross-correlation of complex sequences
//!
//! All modes use the convention `c[k] = Σ x[n + k] · conj(y[n])` and are
//! evaluated through the FFT.

use crate::domain::{DpdError, DpdResult, Sample};

use super::fft::FftProcessor;

/// Linear and circular cross-correlation
pub struct Correlator;

impl Correlator {
    /// Correlation over every lag where `y` fully overlaps `x`
    ///
    /// Yields `len(x) - len(y) + 1` values; index `k` is lag `k`.
    pub fn linear(x: &[Sample], y: &[Sample]) -> DpdResult<Vec<Sample>> {
        if y.is_empty() {
            return Err(DpdError::InvalidArgument(
                "correlation template is empty".to_string(),
            ));
        }
        if x.len() < y.len() {
            return Err(DpdError::mismatch("linear correlation", y.len(), x.len()));
        }

        // Padding to len(x) + len(y) - 1 keeps the valid lags free of wraparound
        let size = x.len() + y.len() - 1;
        let processor = FftProcessor::new(size);
        let mut spectrum = processor.forward(x);
        let reference = processor.forward(y);
        for (s, r) in spectrum.iter_mut().zip(&reference) {
            *s *= r.conj();
        }
        processor.inverse_in_place(&mut spectrum);

        spectrum.truncate(x.len() - y.len() + 1);
        Ok(spectrum)
    }

    /// Circular correlation of equal-length sequences; index `k` is lag `k mod N`
    pub fn circular(x: &[Sample], y: &[Sample]) -> DpdResult<Vec<Sample>> {
        if x.len() != y.len() {
            return Err(DpdError::mismatch("circular correlation", x.len(), y.len()));
        }
        if x.is_empty() {
            return Ok(Vec::new());
        }

        let processor = FftProcessor::new(x.len());
        let mut spectrum = processor.forward(x);
        let reference = processor.forward(y);
        for (s, r) in spectrum.iter_mut().zip(&reference) {
            *s *= r.conj();
        }
        processor.inverse_in_place(&mut spectrum);
        Ok(spectrum)
    }

    /// Circular correlation re-indexed around zero lag
    ///
    /// Output has length `len(x)`; index `k` is lag `k - len(x)/2`
    /// (see [`Correlator::centered_lag`]).
    pub fn centered(x: &[Sample], y: &[Sample]) -> DpdResult<Vec<Sample>> {
        let circular = Self::circular(x, y)?;
        let n = circular.len();
        let half = n / 2;
        Ok((0..n).map(|k| circular[(k + n - half) % n]).collect())
    }

    /// Lag represented by index `k` of a centered correlation of length `n`
    pub fn centered_lag(k: usize, n: usize) -> isize {
        k as isize - (n / 2) as isize
    }
}
