//! Spectral synthesis of sinusoids.
//!
//! Each sinusoid is drawn directly into the spectrum as the main lobe of a
//! Blackman-Harris window, which the inverse transform turns into a
//! Blackman-Harris-shaped frame.

use rustfft::num_complex::Complex;
use std::f64::consts::PI;

use super::types::SpectralPeak;
use super::window::BH_COEFFS;

/// Bins on each side of the lobe center.
const LOBE_HALF_WIDTH: i64 = 4;

/// Samples the spectrum of a `size`-point Blackman-Harris window at the given
/// bin offsets, normalized to 1 at offset 0.
pub fn blackman_harris_lobe(offsets: &[f64], size: usize) -> Vec<f64> {
    let n = size as f64;
    let df = 2.0 * PI / n;
    offsets
        .iter()
        .map(|&x| {
            let f = x * df;
            let sum: f64 = BH_COEFFS
                .iter()
                .enumerate()
                .map(|(m, &a)| {
                    let shift = df * m as f64;
                    a / 2.0 * (periodic_sinc(f - shift, n) + periodic_sinc(f + shift, n))
                })
                .sum();
            sum / n / BH_COEFFS[0]
        })
        .collect()
}

/// `sin(N x / 2) / sin(x / 2)`, equal to `N` where the denominator vanishes.
fn periodic_sinc(x: f64, n: f64) -> f64 {
    let denom = (x / 2.0).sin();
    if denom.abs() < 1e-12 {
        n
    } else {
        (n * x / 2.0).sin() / denom
    }
}

/// Builds the complex spectrum of `size` bins containing one Blackman-Harris
/// lobe per present harmonic.
///
/// Locations are in bins of `size`. Harmonics at location 0 or above
/// `size / 2 - 1` are skipped. The upper half of the result is the conjugate
/// mirror of the lower half, so its inverse transform is real.
pub fn generate_spectral_sines(harmonics: &[SpectralPeak], size: usize) -> Vec<Complex<f64>> {
    let half = size / 2;
    let mut spectrum = vec![Complex::new(0.0, 0.0); size];

    for h in harmonics {
        let loc = h.location;
        if loc == 0.0 || loc > (half - 1) as f64 {
            continue;
        }

        let center = loc.round();
        let remainder = center - loc;
        let offsets: Vec<f64> = (-LOBE_HALF_WIDTH..=LOBE_HALF_WIDTH)
            .map(|m| remainder + m as f64)
            .collect();
        let amplitude = 10f64.powf(h.magnitude_db / 20.0);
        let lobe = blackman_harris_lobe(&offsets, size);

        let positive = Complex::from_polar(1.0, h.phase);
        let negative = positive.conj();
        for (m, &lmag) in (-LOBE_HALF_WIDTH..=LOBE_HALF_WIDTH).zip(&lobe) {
            let bin = center as i64 + m;
            let value = lmag * amplitude;
            if bin < 0 {
                // lobe crosses DC
                spectrum[(-bin) as usize] += negative * value;
            } else if bin == 0 || bin == half as i64 {
                spectrum[bin as usize] += (positive + negative) * value;
            } else if bin < half as i64 {
                spectrum[bin as usize] += positive * value;
            }
        }
    }

    for k in 1..half {
        spectrum[size - k] = spectrum[k].conj();
    }
    spectrum
}
