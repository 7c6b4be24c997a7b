//! Spectral peak picking with parabolic refinement.

use super::spectrum::interp_linear;
use super::types::SpectralPeak;

/// Finds local maxima of a dB magnitude spectrum above `threshold_db`.
///
/// The first and last bins are never reported. Locations are returned in
/// ascending order.
pub fn detect_peaks(mx: &[f64], threshold_db: f64) -> Vec<usize> {
    if mx.len() < 3 {
        return Vec::new();
    }
    (1..mx.len() - 1)
        .filter(|&i| mx[i] > threshold_db && mx[i] > mx[i - 1] && mx[i] > mx[i + 1])
        .collect()
}

/// Refines peak locations and magnitudes by fitting a parabola through each
/// peak and its two neighbors; the phase is read from the unwrapped phase
/// spectrum at the refined location.
///
/// # Arguments
/// * `mx` - Magnitude spectrum in dB
/// * `px` - Unwrapped phase spectrum
/// * `locations` - Peak bins as returned by [`detect_peaks`]
pub fn interpolate_peaks(mx: &[f64], px: &[f64], locations: &[usize]) -> Vec<SpectralPeak> {
    locations
        .iter()
        .map(|&p| {
            let val = mx[p];
            let lval = mx[p - 1];
            let rval = mx[p + 1];
            let curvature = lval - 2.0 * val + rval;
            let offset = if curvature != 0.0 {
                0.5 * (lval - rval) / curvature
            } else {
                0.0
            };
            let location = p as f64 + offset;
            SpectralPeak {
                location,
                magnitude_db: val - 0.25 * (lval - rval) * offset,
                phase: interp_linear(px, location),
            }
        })
        .collect()
}
