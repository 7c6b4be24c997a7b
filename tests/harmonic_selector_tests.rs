// Harmonic selector tests
//
// These tests exercise the assignment of spectral peaks to the harmonics of
// an f0 hypothesis: the unvoiced sentinel, the relative deviation bound, the
// Nyquist cutoff, the duplicate-binding rule and greedy tie-breaking.
//
// Most tests use a sample rate equal to the FFT size so that bin locations
// equal frequencies in Hz exactly.

use harmonic_model::model::harmonics::rescale_locations;
use harmonic_model::model::{select_harmonics, SpectralPeak, ABSENT_MAGNITUDE_DB};

fn peak(location: f64, magnitude_db: f64) -> SpectralPeak {
    SpectralPeak {
        location,
        magnitude_db,
        phase: 0.25 * location,
    }
}

/// Test that an unvoiced frame yields only sentinel slots.
#[test]
fn test_unvoiced_returns_sentinels() {
    let peaks = vec![peak(100.0, -10.0), peak(200.0, -20.0)];
    for f0 in [0.0, -50.0] {
        let slots = select_harmonics(&peaks, f0, 1024, 1024, 6, 0.2);
        assert_eq!(slots.len(), 6);
        for slot in &slots {
            assert_eq!(slot.magnitude_db, ABSENT_MAGNITUDE_DB);
            assert_eq!(slot.location, 0.0);
            assert!(!slot.is_present());
        }
    }
}

/// Test that a frame without peaks yields only sentinel slots.
#[test]
fn test_no_peaks_returns_sentinels() {
    let slots = select_harmonics(&[], 100.0, 1024, 1024, 4, 0.2);
    assert!(slots.iter().all(|s| *s == SpectralPeak::ABSENT));
}

/// Test a clean harmonic series.
///
/// This test verifies:
/// - Slot k holds harmonic k + 1
/// - Magnitude and phase are copied from the peak
#[test]
fn test_exact_series_is_bound_in_order() {
    let peaks: Vec<SpectralPeak> = (1..=4).map(|k| peak(100.0 * k as f64, -6.0 * k as f64)).collect();
    let slots = select_harmonics(&peaks, 100.0, 1024, 1024, 4, 0.2);
    for (k, slot) in slots.iter().enumerate() {
        assert_eq!(*slot, peaks[k]);
    }
}

/// Test the strict relative deviation bound.
#[test]
fn test_deviation_bound_is_strict() {
    // 20 Hz off a 100 Hz harmonic with 20% tolerance is rejected
    let slots = select_harmonics(&[peak(120.0, -10.0)], 100.0, 1024, 1024, 1, 0.2);
    assert!(!slots[0].is_present());

    let slots = select_harmonics(&[peak(119.0, -10.0)], 100.0, 1024, 1024, 1, 0.2);
    assert!(slots[0].is_present());
}

/// Test that the tolerance grows with the harmonic number.
#[test]
fn test_tolerance_scales_with_harmonic_number() {
    // 30 Hz off: too far for harmonic 1 (20 Hz) but fine for harmonic 3 (60 Hz)
    let peaks = vec![peak(130.0, -10.0), peak(330.0, -10.0)];
    let slots = select_harmonics(&peaks, 100.0, 1024, 1024, 3, 0.2);
    assert!(!slots[0].is_present());
    assert_eq!(slots[2].location, 330.0);
}

/// Test that no slot is populated at or above Nyquist.
#[test]
fn test_nyquist_cutoff() {
    // Nyquist is 512 Hz; harmonic 2 of 256 Hz sits exactly on it
    let peaks = vec![peak(256.0, -10.0), peak(510.0, -10.0)];
    let slots = select_harmonics(&peaks, 256.0, 1024, 1024, 4, 0.2);
    assert!(slots[0].is_present());
    assert!(slots[1..].iter().all(|s| !s.is_present()));
}

/// Test that a peak already held by a lower harmonic is not reused.
#[test]
fn test_no_duplicate_binding() {
    let peaks = vec![peak(100.0, -10.0), peak(200.0, -10.0)];
    // With 50% tolerance harmonic 3 (300 Hz) would accept the 200 Hz peak
    let slots = select_harmonics(&peaks, 100.0, 1024, 1024, 4, 0.5);
    assert_eq!(slots[0].location, 100.0);
    assert_eq!(slots[1].location, 200.0);
    assert!(!slots[2].is_present());
    assert!(!slots[3].is_present());
}

/// Test that equidistant peaks resolve to the lowest index.
#[test]
fn test_tie_goes_to_first_peak() {
    let peaks = vec![peak(90.0, -30.0), peak(110.0, -10.0)];
    let slots = select_harmonics(&peaks, 100.0, 1024, 1024, 1, 0.2);
    assert_eq!(slots[0].location, 90.0);
}

/// Test the selector invariants on a dense, irregular peak set.
///
/// This test verifies:
/// - Present slots never share a peak location
/// - Every present slot is within the relative deviation bound
/// - No present slot corresponds to a harmonic at or above Nyquist
#[test]
fn test_invariants_on_dense_peaks() {
    let sample_rate = 44100;
    let fft_size = 2048;
    let peaks: Vec<SpectralPeak> = (1..300)
        .map(|i| {
            let jitter = ((i * 7919) % 13) as f64 * 0.07;
            peak(i as f64 * 3.3 + jitter, -20.0 - (i % 17) as f64)
        })
        .collect();

    for &f0 in &[97.0, 180.5, 311.0, 4000.0] {
        let max_dev = 0.3;
        let slots = select_harmonics(&peaks, f0, sample_rate, fft_size, 40, max_dev);
        let mut seen = Vec::new();
        for (k, slot) in slots.iter().enumerate() {
            if !slot.is_present() {
                continue;
            }
            let harmonic = f0 * (k + 1) as f64;
            assert!(harmonic < sample_rate as f64 / 2.0);
            let freq = slot.frequency(fft_size, sample_rate);
            assert!((freq - harmonic).abs() < max_dev * harmonic);
            assert!(!seen.contains(&slot.location), "peak bound twice");
            seen.push(slot.location);
        }
    }
}

/// Test conversion of locations to the synthesis FFT grid.
#[test]
fn test_rescale_keeps_sentinels() {
    let mut slots = vec![peak(400.0, -10.0), SpectralPeak::ABSENT, peak(100.0, -20.0)];
    rescale_locations(&mut slots, 2048, 512);
    assert_eq!(slots[0].location, 100.0);
    assert_eq!(slots[1], SpectralPeak::ABSENT);
    assert_eq!(slots[2].location, 25.0);
}
