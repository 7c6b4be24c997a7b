// Test utilities and common constants
//
// This file provides shared signal generators, measurements and parameter
// presets used across the test files. Fixtures are synthesized on the fly,
// so no audio files need to be checked in.

use std::f64::consts::PI;
use std::path::PathBuf;

use harmonic_model::model::window::generate_window;
use harmonic_model::model::{ModelParams, WindowType};
use rustfft::{num_complex::Complex, FftPlanner};

/// Sample rate used by most tests
#[allow(dead_code)]
pub const SAMPLE_RATE: u32 = 44100;

/// Generate a sine wave. The phase is computed in f64 so long signals stay clean.
#[allow(dead_code)]
pub fn gen_sine(freq_hz: f64, sample_rate: u32, n: usize, amplitude: f64) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * freq_hz * i as f64 / sample_rate as f64;
            (amplitude * phase.sin()) as f32
        })
        .collect()
}

/// Generate a harmonic tone; `amplitudes[k]` is the amplitude of harmonic k + 1.
#[allow(dead_code)]
pub fn gen_harmonic_tone(f0: f64, sample_rate: u32, n: usize, amplitudes: &[f64]) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            amplitudes
                .iter()
                .enumerate()
                .map(|(k, &a)| a * (2.0 * PI * f0 * (k + 1) as f64 * t).sin())
                .sum::<f64>() as f32
        })
        .collect()
}

/// RMS of `signal[start..end]`.
#[allow(dead_code)]
pub fn rms(signal: &[f32], start: usize, end: usize) -> f64 {
    let end = end.min(signal.len());
    if end <= start {
        return 0.0;
    }
    let sum_sq: f64 = signal[start..end]
        .iter()
        .map(|&s| (s as f64) * (s as f64))
        .sum();
    (sum_sq / (end - start) as f64).sqrt()
}

/// Frequency of the strongest bin of a Hann-windowed FFT over `signal`.
///
/// Returns `(frequency_hz, bin_width_hz)`.
#[allow(dead_code)]
pub fn dominant_frequency(signal: &[f32], sample_rate: u32) -> (f64, f64) {
    let n = signal.len();
    let window = generate_window(WindowType::Hann, n);
    let mut buffer: Vec<Complex<f64>> = signal
        .iter()
        .zip(&window)
        .map(|(&x, &w)| Complex::new(x as f64 * w, 0.0))
        .collect();
    FftPlanner::new().plan_fft_forward(n).process(&mut buffer);

    let peak_bin = buffer[1..n / 2]
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
        .map(|(i, _)| i + 1)
        .unwrap_or(0);
    let bin_width = sample_rate as f64 / n as f64;
    (peak_bin as f64 * bin_width, bin_width)
}

/// Model parameters tuned for a clean pure tone between 300 and 600 Hz.
#[allow(dead_code)]
pub fn pure_tone_params() -> ModelParams {
    ModelParams {
        sample_rate: SAMPLE_RATE,
        window: generate_window(WindowType::BlackmanHarris, 1025),
        fft_size: 2048,
        threshold_db: -80.0,
        max_harmonics: 20,
        min_f0: 300.0,
        max_f0: 600.0,
        f0_error_threshold: 5.0,
        max_harmonic_deviation: 0.2,
    }
}

/// Model parameters for harmonic tones with an f0 between 150 and 300 Hz.
#[allow(dead_code)]
pub fn harmonic_tone_params() -> ModelParams {
    ModelParams {
        sample_rate: SAMPLE_RATE,
        window: generate_window(WindowType::BlackmanHarris, 2049),
        fft_size: 4096,
        threshold_db: -80.0,
        max_harmonics: 20,
        min_f0: 150.0,
        max_f0: 300.0,
        f0_error_threshold: 5.0,
        max_harmonic_deviation: 0.2,
    }
}

/// A unique path in the system temp directory.
#[allow(dead_code)]
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "harmonic_model_{}_{}",
        std::process::id(),
        name
    ))
}

/// Sanity check of the generators the other tests rely on.
#[test]
fn test_signal_generators() {
    let sine = gen_sine(1000.0, SAMPLE_RATE, 44100, 0.5);
    assert_eq!(sine.len(), 44100);
    let level = rms(&sine, 0, sine.len());
    assert!((level - 0.5 / 2f64.sqrt()).abs() < 1e-3);

    let (freq, bin_width) = dominant_frequency(&sine[..8192], SAMPLE_RATE);
    assert!((freq - 1000.0).abs() <= bin_width);
}
