//! Signal quality metrics: RMS, NMSE, PAPR and ACPR

use serde::{Deserialize, Serialize};

use crate::domain::{DpdError, DpdResult, Frequency, Sample};

use super::fft::{hann_window, FftProcessor};

/// Welch segment length used for ACPR
pub const ACPR_SEGMENT_LEN: usize = 2048;

/// Root-mean-square magnitude (zero for an empty signal)
pub fn rms(x: &[Sample]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    (x.iter().map(|v| v.norm_sqr()).sum::<f64>() / x.len() as f64).sqrt()
}

fn power_normalized(x: &[Sample]) -> DpdResult<Vec<Sample>> {
    let level = rms(x);
    if level == 0.0 || !level.is_finite() {
        return Err(DpdError::NumericDegeneracy(format!(
            "cannot power-normalize a signal with RMS {level}"
        )));
    }
    Ok(x.iter().map(|v| v / level).collect())
}

/// Normalized mean-square error of `y` against reference `x`, in dB
///
/// Both signals are RMS-normalized first, so only shape and phase errors count.
pub fn nmse(x: &[Sample], y: &[Sample]) -> DpdResult<f64> {
    if x.len() != y.len() {
        return Err(DpdError::mismatch("nmse", x.len(), y.len()));
    }
    let reference = power_normalized(x)?;
    let measured = power_normalized(y)?;

    let err = reference
        .iter()
        .zip(&measured)
        .map(|(a, b)| (a - b).norm_sqr())
        .sum::<f64>()
        / x.len() as f64;
    let power = reference.iter().map(|v| v.norm_sqr()).sum::<f64>() / x.len() as f64;

    let nmse = 10.0 * (err / power).log10();
    log::info!("NMSE: {nmse:.3} dB");
    Ok(nmse)
}

/// Peak-to-average power ratio, in dB
pub fn papr(x: &[Sample]) -> DpdResult<f64> {
    let level = rms(x);
    if level == 0.0 {
        return Err(DpdError::NumericDegeneracy(
            "PAPR of a zero-energy signal".to_string(),
        ));
    }
    let peak = x.iter().map(|v| v.norm()).fold(0.0, f64::max);
    Ok(20.0 * (peak / level).log10())
}

/// Two-sided power spectral density
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Frequency of each bin in Hz, ascending (negative frequencies first)
    pub frequencies: Vec<f64>,
    /// Density in power per Hz
    pub density: Vec<f64>,
}

impl Spectrum {
    /// Total power in the open band `(centre - width/2, centre + width/2)`
    pub fn band_power(&self, centre: f64, width: f64) -> f64 {
        let (lo, hi) = (centre - width / 2.0, centre + width / 2.0);
        self.frequencies
            .iter()
            .zip(&self.density)
            .filter(|(&f, _)| f > lo && f < hi)
            .map(|(_, &p)| p)
            .sum()
    }
}

/// Welch PSD: periodic Hann window, 50% overlap, per-segment mean removal
///
/// `segment_len` is clamped to the signal length.
pub fn welch_psd(x: &[Sample], sample_rate: Frequency, segment_len: usize) -> DpdResult<Spectrum> {
    let fs = sample_rate.as_hz();
    if x.is_empty() || segment_len == 0 {
        return Err(DpdError::InvalidArgument(
            "Welch PSD needs a non-empty signal and segment".to_string(),
        ));
    }
    if !(fs > 0.0) {
        return Err(DpdError::InvalidArgument(format!(
            "sample rate must be positive, got {fs} Hz"
        )));
    }

    let nperseg = segment_len.min(x.len());
    let step = (nperseg - nperseg / 2).max(1);
    let window = hann_window(nperseg);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let processor = FftProcessor::new(nperseg);

    let mut accumulated = vec![0.0; nperseg];
    let mut segments = 0usize;
    let mut start = 0;
    while start + nperseg <= x.len() {
        let segment = &x[start..start + nperseg];
        let mean = segment.iter().sum::<Sample>() / nperseg as f64;
        let windowed: Vec<Sample> = segment
            .iter()
            .zip(&window)
            .map(|(&s, &w)| (s - mean) * w)
            .collect();
        for (acc, bin) in accumulated.iter_mut().zip(processor.forward(&windowed)) {
            *acc += bin.norm_sqr();
        }
        segments += 1;
        start += step;
    }

    let scale = 1.0 / (fs * window_power * segments as f64);
    let shift = nperseg - nperseg / 2;
    let mut frequencies = Vec::with_capacity(nperseg);
    let mut density = Vec::with_capacity(nperseg);
    for j in 0..nperseg {
        let k = (j + shift) % nperseg;
        let signed = if k < nperseg - nperseg / 2 {
            k as f64
        } else {
            k as f64 - nperseg as f64
        };
        frequencies.push(signed * fs / nperseg as f64);
        density.push(accumulated[k] * scale);
    }

    Ok(Spectrum {
        frequencies,
        density,
    })
}

/// Adjacent-channel power ratios in dBc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcprReport {
    pub lower1: f64,
    pub upper1: f64,
    pub lower2: f64,
    pub upper2: f64,
}

/// ACPR of the first and second adjacent channels around DC
///
/// Channels of width `bandwidth` sit at `±offset` and `±2·offset`.
pub fn acpr(
    x: &[Sample],
    sample_rate: Frequency,
    offset: Frequency,
    bandwidth: Frequency,
) -> DpdResult<AcprReport> {
    let spectrum = welch_psd(x, sample_rate, ACPR_SEGMENT_LEN)?;
    let bw = bandwidth.as_hz();
    let main = spectrum.band_power(0.0, bw);
    if !(main > 0.0) {
        return Err(DpdError::NumericDegeneracy(
            "main channel holds no power".to_string(),
        ));
    }

    let dbc = |centre: f64| 10.0 * (spectrum.band_power(centre, bw) / main).log10();
    let off = offset.as_hz();
    let report = AcprReport {
        lower1: dbc(-off),
        upper1: dbc(off),
        lower2: dbc(-2.0 * off),
        upper2: dbc(2.0 * off),
    };

    log::info!(
        "ACPR1_L: {:.3} dBc, ACPR1_U: {:.3} dBc",
        report.lower1,
        report.upper1
    );
    log::info!(
        "ACPR2_L: {:.3} dBc, ACPR2_U: {:.3} dBc",
        report.lower2,
        report.upper2
    );
    Ok(report)
}
