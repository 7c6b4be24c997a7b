/// Sinusoidal harmonic model.
///
/// This module provides functionality to:
/// - Window a signal frame by frame with zero-phase alignment
/// - Pick and refine spectral peaks
/// - Estimate f0 with the two-way mismatch procedure
/// - Bind peaks to the harmonics of the estimated f0
/// - Resynthesize the harmonics by spectral synthesis and overlap-add
pub mod f0;
pub mod harmonics;
pub mod peaks;
pub mod spectrum;
pub mod synth;
pub mod window;

mod engine;
mod types;

pub use engine::{analyze, resynthesize, HarmonicModel};
pub use harmonics::select_harmonics;
pub use types::{
    HarmonicFrame, ModelError, ModelParams, SpectralPeak, ABSENT_MAGNITUDE_DB, HOP_SIZE,
    MIN_FFT_SIZE, SYNTH_FFT_SIZE, SYNTH_HALF_SIZE,
};
pub use window::WindowType;
