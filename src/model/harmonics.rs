//! Assignment of spectral peaks to the harmonics of an f0 hypothesis.

use super::types::SpectralPeak;

/// Binds each of the first `max_harmonics` harmonics of `f0` to its closest
/// peak.
///
/// Slot `k` describes harmonic `k + 1`. A slot is filled only when the
/// closest peak deviates from the harmonic frequency by less than
/// `max_harmonic_deviation` times that frequency and the peak is not already
/// held by a lower slot. The search is greedy: ties go to the lowest peak
/// index. Slots at or above Nyquist, and every slot when `f0 <= 0`, stay
/// [`SpectralPeak::ABSENT`].
///
/// # Arguments
/// * `peaks` - Refined peaks with locations in bins of an `fft_size` FFT
/// * `f0` - Fundamental frequency hypothesis in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `fft_size` - FFT size the peak locations refer to
/// * `max_harmonics` - Number of slots to return
/// * `max_harmonic_deviation` - Relative deviation tolerance
pub fn select_harmonics(
    peaks: &[SpectralPeak],
    f0: f64,
    sample_rate: u32,
    fft_size: usize,
    max_harmonics: usize,
    max_harmonic_deviation: f64,
) -> Vec<SpectralPeak> {
    let mut slots = vec![SpectralPeak::ABSENT; max_harmonics];
    if f0 <= 0.0 || peaks.is_empty() {
        return slots;
    }

    let nyquist = sample_rate as f64 / 2.0;
    let freqs: Vec<f64> = peaks
        .iter()
        .map(|p| p.frequency(fft_size, sample_rate))
        .collect();

    for k in 0..max_harmonics {
        let harmonic = f0 * (k + 1) as f64;
        if harmonic >= nyquist {
            break;
        }

        let (closest, deviation) = freqs
            .iter()
            .map(|&f| (f - harmonic).abs())
            .enumerate()
            .fold((0, f64::INFINITY), |acc, (i, d)| if d < acc.1 { (i, d) } else { acc });

        let candidate = peaks[closest];
        let already_bound = slots[..k]
            .iter()
            .any(|h| h.location == candidate.location);
        if !already_bound && deviation < max_harmonic_deviation * harmonic {
            slots[k] = candidate;
        }
    }

    slots
}

/// Converts harmonic locations from analysis bins to bins of an FFT of
/// `target_size`. Absent slots keep location 0.
pub fn rescale_locations(harmonics: &mut [SpectralPeak], fft_size: usize, target_size: usize) {
    let ratio = target_size as f64 / fft_size as f64;
    for h in harmonics.iter_mut().filter(|h| h.is_present()) {
        h.location *= ratio;
    }
}
