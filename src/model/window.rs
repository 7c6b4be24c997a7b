//! Window functions for analysis and synthesis.
//!
//! All windows are symmetric. The synthesis window pairs a triangular
//! overlap window with the inverse of the Blackman-Harris envelope that the
//! spectral sinusoid generator imprints on every synthesized frame.

use serde::Deserialize;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Blackman-Harris window coefficients (4-term).
pub(crate) const BH_COEFFS: [f64; 4] = [0.35875, 0.48829, 0.14128, 0.01168];

/// Blackman window coefficients.
const BLACKMAN_COEFFS: [f64; 3] = [0.42, 0.5, 0.08];

/// Analysis window types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Rectangular,
    Hann,
    Hamming,
    Blackman,
    #[serde(alias = "blackman-harris")]
    BlackmanHarris,
}

impl FromStr for WindowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rectangular" | "boxcar" => Ok(WindowType::Rectangular),
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "blackmanharris" | "blackman-harris" => Ok(WindowType::BlackmanHarris),
            other => Err(format!("unknown window type: {}", other)),
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowType::Rectangular => "rectangular",
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::BlackmanHarris => "blackmanharris",
        };
        f.write_str(name)
    }
}

/// Generates a window function of the specified type and size.
pub fn generate_window(window_type: WindowType, size: usize) -> Vec<f64> {
    match window_type {
        WindowType::Rectangular => vec![1.0; size],
        WindowType::Hann => cosine_sum_window(&[0.5, 0.5], size),
        WindowType::Hamming => cosine_sum_window(&[0.54, 0.46], size),
        WindowType::Blackman => cosine_sum_window(&BLACKMAN_COEFFS, size),
        WindowType::BlackmanHarris => cosine_sum_window(&BH_COEFFS, size),
    }
}

/// Generalized cosine window `sum_k (-1)^k a_k cos(2 pi k n / (M - 1))`.
fn cosine_sum_window(coeffs: &[f64], size: usize) -> Vec<f64> {
    match size {
        0 => return vec![],
        1 => return vec![1.0],
        _ => {}
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|n| {
            let x = 2.0 * PI * n as f64 / denom;
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (k as f64 * x).cos()
                })
                .sum()
        })
        .collect()
}

/// Generates a triangular window with non-zero end points.
pub fn triangular_window(size: usize) -> Vec<f64> {
    let m = size as f64;
    let half = size.div_ceil(2);
    let rising: Vec<f64> = (0..half)
        .map(|n| {
            if size % 2 == 0 {
                (2.0 * n as f64 + 1.0) / m
            } else {
                2.0 * (n as f64 + 1.0) / (m + 1.0)
            }
        })
        .collect();

    let mut window = rising.clone();
    let mirrored = if size % 2 == 0 {
        &rising[..]
    } else {
        &rising[..half - 1]
    };
    window.extend(mirrored.iter().rev());
    window
}

/// Scales a window so its samples sum to one.
///
/// A window with a zero sum is returned unchanged.
pub fn normalize_window(window: &[f64]) -> Vec<f64> {
    let sum: f64 = window.iter().sum();
    if sum == 0.0 {
        return window.to_vec();
    }
    window.iter().map(|&w| w / sum).collect()
}

/// Builds the synthesis window for frames of `size` samples overlapped every
/// `hop` samples.
///
/// The central `2 * hop` samples hold a triangular window divided by the
/// sum-normalized Blackman-Harris window; everything else is zero.
pub fn synthesis_window(size: usize, hop: usize) -> Vec<f64> {
    let half = size / 2;
    let overlap = triangular_window(2 * hop);
    let bh = normalize_window(&generate_window(WindowType::BlackmanHarris, size));

    let mut window = vec![0.0; size];
    for (i, &ow) in overlap.iter().enumerate() {
        let idx = half - hop + i;
        window[idx] = ow / bh[idx];
    }
    window
}
