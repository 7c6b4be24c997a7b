//! Zero-phase buffering and spectrum conversions.

use rustfft::num_complex::Complex;
use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Places an odd-length windowed segment into `buffer` so that its center
/// sample lands on index 0.
///
/// The second half of the segment (center included) goes to the start of the
/// buffer, the first half to the end; the rest of the buffer is zeroed.
pub fn zero_phase_fill(buffer: &mut [Complex<f64>], windowed: &[f64]) {
    let n = buffer.len();
    let half = (windowed.len() + 1) / 2;
    debug_assert!(windowed.len() <= n);

    buffer.iter_mut().for_each(|c| *c = Complex::new(0.0, 0.0));
    for (slot, &x) in buffer[..half].iter_mut().zip(&windowed[half - 1..]) {
        *slot = Complex::new(x, 0.0);
    }
    for (slot, &x) in buffer[n - half + 1..].iter_mut().zip(&windowed[..half - 1]) {
        *slot = Complex::new(x, 0.0);
    }
}

/// Undoes the zero-phase arrangement of an inverse transform of even size.
///
/// Index 0 of `buffer` ends up at `half - 1` of `frame`.
pub fn undo_zero_phase(buffer: &[Complex<f64>], frame: &mut [f64]) {
    let n = buffer.len();
    let half = n / 2;
    debug_assert_eq!(frame.len(), n);

    for (out, c) in frame[..half - 1].iter_mut().zip(&buffer[half + 1..]) {
        *out = c.re;
    }
    for (out, c) in frame[half - 1..].iter_mut().zip(&buffer[..half + 1]) {
        *out = c.re;
    }
}

/// Magnitude in dB of the first `bins` entries of a spectrum.
///
/// Magnitudes are floored at machine epsilon so silent bins stay finite.
pub fn magnitude_db(spectrum: &[Complex<f64>], bins: usize) -> Vec<f64> {
    spectrum[..bins]
        .iter()
        .map(|c| 20.0 * c.norm().max(f64::EPSILON).log10())
        .collect()
}

/// Unwrapped phase of the first `bins` entries of a spectrum.
pub fn phase_unwrapped(spectrum: &[Complex<f64>], bins: usize) -> Vec<f64> {
    let mut phases: Vec<f64> = spectrum[..bins].iter().map(|c| c.arg()).collect();
    unwrap_phase(&mut phases);
    phases
}

/// Removes 2π jumps between consecutive phase values in place.
pub fn unwrap_phase(phases: &mut [f64]) {
    let mut correction = 0.0;
    let mut prev = match phases.first() {
        Some(&p) => p,
        None => return,
    };

    for p in phases.iter_mut().skip(1) {
        let raw = *p;
        let diff = raw - prev;
        let mut wrapped = (diff + PI).rem_euclid(TWO_PI) - PI;
        if wrapped == -PI && diff > 0.0 {
            wrapped = PI;
        }
        if diff.abs() >= PI {
            correction += wrapped - diff;
        }
        prev = raw;
        *p = raw + correction;
    }
}

/// Linear interpolation of `values` (sampled at integer positions) at `x`.
///
/// Positions outside the sampled range take the nearest end value.
pub fn interp_linear(values: &[f64], x: f64) -> f64 {
    match values.len() {
        0 => return 0.0,
        1 => return values[0],
        _ => {}
    }
    let last = values.len() - 1;
    if x <= 0.0 {
        return values[0];
    }
    if x >= last as f64 {
        return values[last];
    }
    let i = x.floor() as usize;
    let frac = x - i as f64;
    values[i] + frac * (values[i + 1] - values[i])
}
