//! Fundamental frequency estimation with the two-way mismatch procedure.
//!
//! Every candidate f0 is scored twice: how well its predicted harmonic series
//! is explained by the measured peaks, and how well the measured peaks are
//! explained by the series. The candidate with the lowest combined error wins.

use super::types::{SpectralPeak, ABSENT_MAGNITUDE_DB};

/// Frequency weighting exponent.
const TWM_P: f64 = 0.5;
/// Magnitude weighting of the frequency term.
const TWM_Q: f64 = 1.4;
/// Magnitude offset.
const TWM_R: f64 = 0.5;
/// Weight of the measured-to-predicted error.
const TWM_RHO: f64 = 0.33;
/// Peaks and harmonics considered per direction.
const TWM_MAX_PEAKS: usize = 10;
/// Loudest peaks used to derive candidates.
const CANDIDATE_PEAKS: usize = 3;
/// Sub-multiples tried for each of those peaks.
const CANDIDATE_DIVISORS: usize = 3;

/// Estimates the fundamental frequency of a frame from its refined peaks.
///
/// Candidates are the frequencies of the three loudest peaks divided by 1, 2
/// and 3, restricted to the open interval `(min_f0, max_f0)`.
///
/// # Returns
/// The winning candidate in Hz, or 0.0 when there are no peaks, no candidate
/// lies inside the search range, or the best mismatch error is not below
/// `error_threshold`.
pub fn estimate_f0(
    peaks: &[SpectralPeak],
    fft_size: usize,
    sample_rate: u32,
    error_threshold: f64,
    min_f0: f64,
    max_f0: f64,
) -> f64 {
    if peaks.is_empty() {
        return 0.0;
    }

    let mut pfreq: Vec<f64> = peaks
        .iter()
        .map(|p| p.frequency(fft_size, sample_rate))
        .collect();
    let mut pmag: Vec<f64> = peaks.iter().map(|p| p.magnitude_db).collect();

    // A peak at 0 Hz cannot be weighted by f^-p.
    for (f, m) in pfreq.iter_mut().zip(pmag.iter_mut()) {
        if *f <= 0.0 {
            *f = 1.0;
            *m = ABSENT_MAGNITUDE_DB;
        }
    }

    let mut by_magnitude: Vec<usize> = (0..pmag.len()).collect();
    by_magnitude.sort_by(|&a, &b| pmag[b].total_cmp(&pmag[a]).then(a.cmp(&b)));

    let candidates: Vec<f64> = by_magnitude
        .iter()
        .take(CANDIDATE_PEAKS)
        .flat_map(|&i| {
            let f = pfreq[i];
            (1..=CANDIDATE_DIVISORS).rev().map(move |d| f / d as f64)
        })
        .filter(|&c| c > min_f0 && c < max_f0)
        .collect();

    if candidates.is_empty() {
        return 0.0;
    }

    let (f0, error) = two_way_mismatch(&pfreq, &pmag, &candidates);
    if f0 > 0.0 && error < error_threshold {
        f0
    } else {
        0.0
    }
}

/// Scores each candidate and returns `(best_candidate, its_error)`.
///
/// `pfreq` and `pmag` must be non-empty, of equal length, with strictly
/// positive frequencies. Ties resolve to the earliest candidate.
pub fn two_way_mismatch(pfreq: &[f64], pmag: &[f64], candidates: &[f64]) -> (f64, f64) {
    let amax = pmag.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mag_factor = |db: f64| 10f64.powf((db - amax) / 20.0);
    let n_pm = TWM_MAX_PEAKS.min(pfreq.len());
    let n_mp = TWM_MAX_PEAKS.min(pfreq.len());

    let mut best = (0.0, f64::INFINITY);
    for &f0 in candidates {
        // predicted to measured
        let mut error_pm = 0.0;
        for k in 1..=n_pm {
            let harmonic = f0 * k as f64;
            let (nearest, distance) = pfreq
                .iter()
                .map(|&f| (f - harmonic).abs())
                .enumerate()
                .fold((0, f64::INFINITY), |acc, (i, d)| if d < acc.1 { (i, d) } else { acc });
            let pond = distance * harmonic.powf(-TWM_P);
            let mag = mag_factor(pmag[nearest]);
            error_pm += pond + mag * (TWM_Q * pond - TWM_R);
        }

        // measured to predicted
        let mut error_mp = 0.0;
        for (&f, &db) in pfreq.iter().zip(pmag).take(n_mp) {
            let nharm = (f / f0).round().max(1.0);
            let pond = (f - nharm * f0).abs() * f.powf(-TWM_P);
            let mag = mag_factor(db);
            error_mp += mag * (pond + mag * (TWM_Q * pond - TWM_R));
        }

        let error = error_pm / n_pm as f64 + TWM_RHO * error_mp / n_mp as f64;
        if error < best.1 {
            best = (f0, error);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_at(freq: f64, magnitude_db: f64, fft_size: usize, sample_rate: u32) -> SpectralPeak {
        SpectralPeak {
            location: freq * fft_size as f64 / sample_rate as f64,
            magnitude_db,
            phase: 0.0,
        }
    }

    #[test]
    fn test_no_peaks_is_unvoiced() {
        assert_eq!(estimate_f0(&[], 2048, 44100, 5.0, 100.0, 500.0), 0.0);
    }

    #[test]
    fn test_single_peak_inside_range() {
        let peaks = [peak_at(440.0, -6.0, 2048, 44100)];
        let f0 = estimate_f0(&peaks, 2048, 44100, 5.0, 300.0, 600.0);
        assert!((f0 - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_harmonic_series_picks_fundamental() {
        let peaks: Vec<SpectralPeak> = (1..=8)
            .map(|k| peak_at(200.0 * k as f64, -6.0 - 3.0 * k as f64, 4096, 44100))
            .collect();
        let f0 = estimate_f0(&peaks, 4096, 44100, 5.0, 150.0, 450.0);
        assert!((f0 - 200.0).abs() < 1e-6, "got {}", f0);
    }

    #[test]
    fn test_missing_fundamental_is_recovered_from_submultiples() {
        // Partials 2..=6 of 150 Hz; the loudest peak is 300 Hz.
        let peaks: Vec<SpectralPeak> = (2..=6)
            .map(|k| peak_at(150.0 * k as f64, -10.0 - k as f64, 4096, 44100))
            .collect();
        let f0 = estimate_f0(&peaks, 4096, 44100, 10.0, 120.0, 180.0);
        assert!((f0 - 150.0).abs() < 1e-6, "got {}", f0);
    }

    #[test]
    fn test_out_of_range_candidates_are_unvoiced() {
        let peaks = [peak_at(1000.0, -6.0, 2048, 44100)];
        assert_eq!(estimate_f0(&peaks, 2048, 44100, 5.0, 100.0, 300.0), 0.0);
    }

    #[test]
    fn test_error_threshold_rejects() {
        let peaks = [peak_at(440.0, -6.0, 2048, 44100)];
        // The single-peak error is negative, so a threshold below it rejects.
        assert_eq!(estimate_f0(&peaks, 2048, 44100, -1.0, 300.0, 600.0), 0.0);
    }
}
