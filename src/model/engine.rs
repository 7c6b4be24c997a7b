//! Frame loop of the harmonic model.
//!
//! A read pointer walks the signal in hops of [`HOP_SIZE`]. At each position
//! the analysis window is applied around the pointer, the zero-phase spectrum
//! is reduced to peaks, an f0 and its harmonics are chosen, and a short
//! frame of [`SYNTH_FFT_SIZE`] samples is synthesized and overlap-added back
//! at the same position.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::f0::estimate_f0;
use super::harmonics::{rescale_locations, select_harmonics};
use super::peaks::{detect_peaks, interpolate_peaks};
use super::spectrum::{magnitude_db, phase_unwrapped, undo_zero_phase, zero_phase_fill};
use super::synth::generate_spectral_sines;
use super::types::{
    HarmonicFrame, ModelError, ModelParams, HOP_SIZE, SYNTH_FFT_SIZE, SYNTH_HALF_SIZE,
};
use super::window::{normalize_window, synthesis_window};

/// Reusable harmonic analysis/synthesis engine.
///
/// Holds the normalized windows, FFT plans and scratch buffers for one
/// parameter set.
pub struct HarmonicModel {
    params: ModelParams,
    /// Sum-normalized analysis window.
    window: Vec<f64>,
    synthesis_window: Vec<f64>,
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
    /// Analysis buffer of `fft_size` bins.
    fft_buffer: Vec<Complex<f64>>,
    /// Synthesis buffer of `SYNTH_FFT_SIZE` bins.
    synth_buffer: Vec<Complex<f64>>,
}

impl HarmonicModel {
    /// Creates an engine after validating `params`.
    pub fn new(params: ModelParams) -> Result<Self, ModelError> {
        params.validate()?;

        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(params.fft_size);
        let fft_inverse = planner.plan_fft_inverse(SYNTH_FFT_SIZE);

        Ok(Self {
            window: normalize_window(&params.window),
            synthesis_window: synthesis_window(SYNTH_FFT_SIZE, HOP_SIZE),
            fft_buffer: vec![Complex::new(0.0, 0.0); params.fft_size],
            synth_buffer: vec![Complex::new(0.0, 0.0); SYNTH_FFT_SIZE],
            fft_forward,
            fft_inverse,
            params,
        })
    }

    /// Returns the parameters this engine was built with.
    #[inline]
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Distance a frame center must keep from both ends of the signal.
    #[inline]
    pub fn frame_margin(&self) -> usize {
        SYNTH_HALF_SIZE.max(self.params.half_window())
    }

    /// Frame centers visited for a signal of `len` samples.
    pub fn frame_centers(&self, len: usize) -> impl Iterator<Item = usize> {
        let margin = self.frame_margin();
        (margin..len.saturating_sub(margin)).step_by(HOP_SIZE)
    }

    /// Number of loop iterations for a signal of `len` samples.
    pub fn frame_count(&self, len: usize) -> usize {
        let margin = self.frame_margin();
        len.saturating_sub(2 * margin).div_ceil(HOP_SIZE)
    }

    /// Analyzes the frame centered on `center`.
    ///
    /// # Errors
    /// * `InvalidParameter` if the analysis window does not fit around `center`
    /// * `NonFiniteInput` if the windowed samples contain NaN or infinity
    pub fn analyze_frame(
        &mut self,
        signal: &[f32],
        center: usize,
    ) -> Result<HarmonicFrame, ModelError> {
        let hm = self.params.half_window();
        let end = center
            .checked_add(hm - 1)
            .filter(|&end| center >= hm && end <= signal.len())
            .ok_or_else(|| {
                ModelError::InvalidParameter(format!(
                    "frame centered at {} does not fit a signal of {} samples",
                    center,
                    signal.len()
                ))
            })?;

        let segment = &signal[center - hm..end];
        check_finite(segment)?;
        let windowed: Vec<f64> = segment
            .iter()
            .zip(&self.window)
            .map(|(&x, &w)| x as f64 * w)
            .collect();
        zero_phase_fill(&mut self.fft_buffer, &windowed);
        self.fft_forward.process(&mut self.fft_buffer);

        let p = &self.params;
        let bins = p.fft_size / 2;
        let mx = magnitude_db(&self.fft_buffer, bins);
        let px = phase_unwrapped(&self.fft_buffer, bins);

        let locations = detect_peaks(&mx, p.threshold_db);
        let peaks = interpolate_peaks(&mx, &px, &locations);
        let f0 = estimate_f0(
            &peaks,
            p.fft_size,
            p.sample_rate,
            p.f0_error_threshold,
            p.min_f0,
            p.max_f0,
        );
        let harmonics = select_harmonics(
            &peaks,
            f0,
            p.sample_rate,
            p.fft_size,
            p.max_harmonics,
            p.max_harmonic_deviation,
        );

        tracing::trace!(center, peaks = peaks.len(), f0, "analyzed frame");

        Ok(HarmonicFrame {
            center,
            f0,
            harmonics,
        })
    }

    /// Synthesizes the windowed output frame of `SYNTH_FFT_SIZE` samples for
    /// an analyzed frame. Sample `SYNTH_HALF_SIZE` lines up with the frame
    /// center when overlap-added at `center - SYNTH_HALF_SIZE`.
    pub fn synthesize_frame(&mut self, frame: &HarmonicFrame) -> Vec<f64> {
        let mut harmonics = frame.harmonics.clone();
        rescale_locations(&mut harmonics, self.params.fft_size, SYNTH_FFT_SIZE);

        let spectrum = generate_spectral_sines(&harmonics, SYNTH_FFT_SIZE);
        self.synth_buffer.copy_from_slice(&spectrum);
        self.fft_inverse.process(&mut self.synth_buffer);

        let norm = 1.0 / SYNTH_FFT_SIZE as f64;
        let mut yh = vec![0.0; SYNTH_FFT_SIZE];
        undo_zero_phase(&self.synth_buffer, &mut yh);
        yh.iter_mut()
            .zip(&self.synthesis_window)
            .for_each(|(y, &sw)| *y *= sw * norm);
        yh
    }

    /// Runs the analysis half of the model over a whole signal.
    pub fn analyze(&mut self, signal: &[f32]) -> Result<Vec<HarmonicFrame>, ModelError> {
        check_finite(signal)?;
        let centers: Vec<usize> = self.frame_centers(signal.len()).collect();
        self.log_start(signal.len(), centers.len());

        let mut frames = Vec::with_capacity(centers.len());
        for center in centers {
            let frame = self.analyze_frame(signal, center)?;
            tracing::debug!(
                center,
                f0 = frame.f0,
                harmonics = frame.present_count(),
                "frame"
            );
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Reconstructs the harmonic component of `signal`.
    ///
    /// The output has the same length as the input. Samples that no frame
    /// reaches stay zero.
    pub fn process(&mut self, signal: &[f32]) -> Result<Vec<f32>, ModelError> {
        check_finite(signal)?;
        let centers: Vec<usize> = self.frame_centers(signal.len()).collect();
        self.log_start(signal.len(), centers.len());

        let mut output = vec![0.0f64; signal.len()];
        for center in centers {
            let frame = self.analyze_frame(signal, center)?;
            tracing::debug!(
                center,
                f0 = frame.f0,
                harmonics = frame.present_count(),
                "frame"
            );

            let yh = self.synthesize_frame(&frame);
            let start = center - SYNTH_HALF_SIZE;
            for (out, y) in output[start..start + SYNTH_FFT_SIZE].iter_mut().zip(&yh) {
                *out += y;
            }
        }

        Ok(output.into_iter().map(|y| y as f32).collect())
    }

    fn log_start(&self, len: usize, frames: usize) {
        if frames == 0 {
            tracing::warn!(
                samples = len,
                minimum = 2 * self.frame_margin() + 1,
                "signal too short for a single frame; output is silent"
            );
            return;
        }
        tracing::info!(
            samples = len,
            frames,
            fft_size = self.params.fft_size,
            window_size = self.params.window.len(),
            "running harmonic model"
        );
    }
}

/// Reconstructs the harmonic component of `signal` with a one-off engine.
///
/// # Errors
/// * `InvalidParameter` if `params` fail validation
/// * `NonFiniteInput` if `signal` contains NaN or infinite samples
pub fn resynthesize(signal: &[f32], params: &ModelParams) -> Result<Vec<f32>, ModelError> {
    HarmonicModel::new(params.clone())?.process(signal)
}

/// Returns the per-frame f0 and harmonic track of `signal`.
pub fn analyze(signal: &[f32], params: &ModelParams) -> Result<Vec<HarmonicFrame>, ModelError> {
    HarmonicModel::new(params.clone())?.analyze(signal)
}

fn check_finite(signal: &[f32]) -> Result<(), ModelError> {
    if signal.iter().any(|s| !s.is_finite()) {
        return Err(ModelError::NonFiniteInput);
    }
    Ok(())
}
