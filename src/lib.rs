//! Sinusoidal-harmonic analysis and resynthesis of monophonic audio.
//!
//! The harmonic model estimates a time-varying fundamental frequency with a
//! two-way mismatch search, binds the first harmonics to spectral peaks and
//! regenerates only the harmonic part of the sound by overlap-adding
//! spectrally synthesized frames.
//!
//! ```
//! use harmonic_model::model::{self, window, ModelParams, WindowType};
//!
//! let sample_rate = 44100;
//! let input: Vec<f32> = (0..8192)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//!
//! let params = ModelParams {
//!     sample_rate,
//!     window: window::generate_window(WindowType::BlackmanHarris, 1025),
//!     fft_size: 2048,
//!     threshold_db: -80.0,
//!     max_harmonics: 20,
//!     min_f0: 300.0,
//!     max_f0: 600.0,
//!     f0_error_threshold: 5.0,
//!     max_harmonic_deviation: 0.2,
//! };
//!
//! let output = model::resynthesize(&input, &params).unwrap();
//! assert_eq!(output.len(), input.len());
//! ```

pub mod audio;
pub mod config;
pub mod model;

pub use audio::{AudioError, WavData};
pub use model::{
    analyze, resynthesize, HarmonicFrame, HarmonicModel, ModelError, ModelParams, SpectralPeak,
    WindowType,
};
