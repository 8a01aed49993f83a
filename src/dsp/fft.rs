//! FFT plans for correlation, convolution and spectral estimates

use std::sync::Arc;
use rustfft::{Fft, FftPlanner};

use crate::domain::Sample;

/// Forward/inverse FFT pair of a fixed size
pub struct FftProcessor {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    fft_size: usize,
}

impl FftProcessor {
    /// Create a new FFT processor with the given size
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);

        Self {
            forward,
            inverse,
            fft_size,
        }
    }

    /// Forward transform of `samples`, zero-padded (or truncated) to `fft_size`
    pub fn forward(&self, samples: &[Sample]) -> Vec<Sample> {
        let mut buffer: Vec<Sample> = samples.iter().take(self.fft_size).copied().collect();
        buffer.resize(self.fft_size, Sample::new(0.0, 0.0));
        self.forward.process(&mut buffer);
        buffer
    }

    /// Normalized inverse transform in place
    pub fn inverse_in_place(&self, buffer: &mut [Sample]) {
        self.inverse.process(buffer);
        let scale = 1.0 / self.fft_size as f64;
        for value in buffer.iter_mut() {
            *value *= scale;
        }
    }
}

/// Periodic Hann window (the spectral-analysis variant)
pub fn hann_window(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let x = std::f64::consts::PI * i as f64 / len as f64;
            0.5 * (1.0 - (2.0 * x).cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_then_inverse_restores_input() {
        let processor = FftProcessor::new(64);
        let samples: Vec<Sample> = (0..64)
            .map(|i| Sample::new((i as f64 * 0.3).sin(), (i as f64 * 0.7).cos()))
            .collect();

        let mut spectrum = processor.forward(&samples);
        processor.inverse_in_place(&mut spectrum);

        for (a, b) in spectrum.iter().zip(&samples) {
            assert!((a - b).norm() < 1e-12, "expected {b}, got {a}");
        }
    }

    #[test]
    fn pure_tone_lands_in_its_bin() {
        let processor = FftProcessor::new(256);
        let bin = 17;
        let samples: Vec<Sample> = (0..256)
            .map(|n| {
                let phase = 2.0 * std::f64::consts::PI * bin as f64 * n as f64 / 256.0;
                Sample::from_polar(1.0, phase)
            })
            .collect();

        let spectrum = processor.forward(&samples);
        let peak_bin = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.norm().partial_cmp(&b.norm()).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        assert_eq!(peak_bin, bin);
    }

    #[test]
    fn hann_window_is_periodic() {
        let window = hann_window(8);
        assert_eq!(window[0], 0.0);
        assert!((window[4] - 1.0).abs() < 1e-12);
        assert!((window[1] - window[7]).abs() < 1e-12);
    }
}
