//! Integration tests: capture impairments → align → compare with reference
//!
//! Each test builds a reference waveform, applies the kind of delay, gain
//! and phase rotation a real capture would have, and checks that the
//! aligner undoes it.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rfdpd::align::{coarse_align, coarse_lag};
use rfdpd::dsp::metrics::rms;
use rfdpd::dsp::{roll, Correlator, SincResampler};
use rfdpd::{align, AlignmentMethod, DpdError, Frequency, Sample};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pseudo_random(n: usize, seed: u64) -> Vec<Sample> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| Sample::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect()
}

/// Two periodic tones with a beating envelope, sampled at `n - delay`
fn multitone(n: usize, delay: f64) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let t = i as f64 - delay;
            Sample::from_polar(1.0, 2.0 * PI * 5.0 * t / n as f64)
                + Sample::from_polar(0.5, 2.0 * PI * 12.0 * t / n as f64)
        })
        .collect()
}

fn impair(x: &[Sample], gain: f64, phase: f64) -> Vec<Sample> {
    let rotation = Sample::from_polar(gain, phase);
    x.iter().map(|v| v * rotation).collect()
}

fn normalized_rmse(reference: &[Sample], measured: &[Sample]) -> f64 {
    let err: f64 = reference
        .iter()
        .zip(measured)
        .map(|(a, b)| (a - b).norm_sqr())
        .sum();
    let power: f64 = reference.iter().map(|v| v.norm_sqr()).sum();
    (err / power).sqrt()
}

/// Lag of the largest linear (zero-padded) correlation between `x` and `y`
fn linear_peak_lag(x: &[Sample], y: &[Sample]) -> isize {
    let n = x.len();
    let mut padded = vec![Sample::new(0.0, 0.0); n - 1];
    padded.extend_from_slice(x);
    padded.extend(std::iter::repeat(Sample::new(0.0, 0.0)).take(n - 1));
    let corr = Correlator::linear(&padded, y).unwrap();
    let peak = corr
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.norm().partial_cmp(&b.norm()).unwrap())
        .map(|(i, _)| i)
        .unwrap();
    peak as isize - (n as isize - 1)
}

#[test]
fn test_identity_for_every_method() {
    init_logging();
    let x = pseudo_random(512, 11);
    for method in AlignmentMethod::ALL {
        let aligned = align(&x, &x, method).unwrap();
        let err = normalized_rmse(&x, &aligned);
        assert!(err < 1e-6, "{method}: identity alignment drifted, NRMSE {err:e}");
    }
}

#[test]
fn test_identity_on_short_records() {
    init_logging();
    for n in [8, 12] {
        for seed in 0..20 {
            let x = pseudo_random(n, 100 + seed);
            for method in AlignmentMethod::ALL {
                let aligned = align(&x, &x, method).unwrap();
                let err = normalized_rmse(&x, &aligned);
                assert!(err < 1e-9, "{method}, n = {n}, seed {seed}: NRMSE {err:e}");
            }
        }
    }
}

#[test]
fn test_spline_recovers_integer_shift_gain_and_phase() {
    init_logging();
    let n = 256;
    let x = pseudo_random(n, 3);
    let half = n as isize / 2;
    for k in (-half..=half).step_by(9).chain([-1, 1, half]) {
        let y = impair(&roll(&x, k), 0.63, 1.1);
        let aligned = align(&x, &y, AlignmentMethod::Spline).unwrap();
        let err = normalized_rmse(&x, &aligned);
        assert!(err < 1e-3, "shift {k}: NRMSE {err:e}");
    }
}

#[test]
fn test_pcf_and_ls_recover_integer_shift() {
    init_logging();
    let x = pseudo_random(300, 5);
    let y = impair(&roll(&x, -42), 1.7, -2.4);
    for method in [AlignmentMethod::Pcf, AlignmentMethod::Ls] {
        let aligned = align(&x, &y, method).unwrap();
        let err = normalized_rmse(&x, &aligned);
        assert!(err < 1e-3, "{method}: NRMSE {err:e}");
    }
}

#[test]
fn test_coarse_alignment_locates_every_shift() {
    let n = 128;
    let x = pseudo_random(n, 21);
    for k in -(n as isize) / 2..=(n as isize) / 2 {
        let y = roll(&x, k);
        let lag = coarse_lag(&x, &y).unwrap() as isize;
        assert_eq!(lag.rem_euclid(n as isize), (-k).rem_euclid(n as isize), "shift {k}");
        assert_eq!(coarse_align(&x, &y).unwrap(), x, "shift {k}");
    }
}

#[test]
fn test_resampler_zero_delay_is_exact() {
    let x = pseudo_random(77, 2);
    assert_eq!(SincResampler::default().shift(&x, 0.0), x);
}

#[test]
fn test_sinusoid_capture_at_122_88_msps() {
    init_logging();
    // 1024-sample tone at normalized frequency 0.01, captured 5 samples late
    let sample_rate = Frequency::mhz(122.88);
    let tone = 0.01 * sample_rate.as_hz();
    let x: Vec<Sample> = (0..1024)
        .map(|n| Sample::from_polar(1.0, 2.0 * PI * tone * n as f64 / sample_rate.as_hz()))
        .collect();
    let y = impair(&roll(&x, 5), 0.9, 0.2);

    let aligned = align(&x, &y, AlignmentMethod::Spline).unwrap();

    assert_eq!(linear_peak_lag(&x, &aligned), 0);
    let ratio = rms(&aligned) / rms(&x);
    assert!((ratio - 1.0).abs() < 0.01, "RMS ratio {ratio}");
}

#[test]
fn test_spline_removes_fractional_delay() {
    init_logging();
    let x = multitone(1024, 0.0);
    for &delay in &[0.3, -0.45, 4.7, -12.2] {
        let y = impair(&multitone(1024, delay), 0.8, -0.7);
        let aligned = align(&x, &y, AlignmentMethod::Spline).unwrap();
        let err = normalized_rmse(&x, &aligned);
        assert!(err < 1e-2, "delay {delay}: NRMSE {err:e}");
    }
}

#[test]
fn test_unknown_method_name_is_rejected() {
    let err = "Sinc".parse::<AlignmentMethod>().unwrap_err();
    assert!(matches!(err, DpdError::InvalidArgument(_)));
}

#[test]
fn test_alignment_leaves_inputs_untouched() {
    let x = pseudo_random(128, 8);
    let y = impair(&roll(&x, 17), 0.5, 0.3);
    let (x_before, y_before) = (x.clone(), y.clone());
    let _ = align(&x, &y, AlignmentMethod::Pcf).unwrap();
    assert_eq!(x, x_before);
    assert_eq!(y, y_before);
}
