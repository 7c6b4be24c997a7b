use serde::Serialize;

/// FFT size used for synthesis.
pub const SYNTH_FFT_SIZE: usize = 512;

/// Hop size shared by analysis and synthesis.
pub const HOP_SIZE: usize = SYNTH_FFT_SIZE / 4;

/// Half of the synthesis FFT size.
pub const SYNTH_HALF_SIZE: usize = SYNTH_FFT_SIZE / 2;

/// Smallest analysis FFT size accepted.
pub const MIN_FFT_SIZE: usize = 512;

/// Magnitude marking a harmonic slot without a matching peak.
pub const ABSENT_MAGNITUDE_DB: f64 = -100.0;

/// A refined spectral peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralPeak {
    /// Fractional bin location.
    pub location: f64,
    /// Magnitude in dB.
    pub magnitude_db: f64,
    /// Unwrapped phase in radians.
    pub phase: f64,
}

impl SpectralPeak {
    /// Slot value for a harmonic that has no matching peak.
    pub const ABSENT: SpectralPeak = SpectralPeak {
        location: 0.0,
        magnitude_db: ABSENT_MAGNITUDE_DB,
        phase: 0.0,
    };

    /// Returns `true` if this slot holds an actual peak.
    #[inline]
    pub fn is_present(&self) -> bool {
        self.location != 0.0
    }

    /// Frequency in Hz of this peak for the given FFT size and sample rate.
    #[inline]
    pub fn frequency(&self, fft_size: usize, sample_rate: u32) -> f64 {
        self.location / fft_size as f64 * sample_rate as f64
    }
}

/// Analysis result of a single frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarmonicFrame {
    /// Sample index the frame is centered on.
    pub center: usize,
    /// Estimated fundamental in Hz, 0 when the frame is unvoiced.
    pub f0: f64,
    /// One slot per harmonic, locations in analysis FFT bins.
    pub harmonics: Vec<SpectralPeak>,
}

impl HarmonicFrame {
    /// Number of harmonic slots bound to a peak.
    pub fn present_count(&self) -> usize {
        self.harmonics.iter().filter(|h| h.is_present()).count()
    }
}

/// Errors raised by the harmonic model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Malformed or out-of-range configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input signal contains NaN or infinite samples
    #[error("Input signal contains non-finite samples")]
    NonFiniteInput,
}

/// Parameters of a harmonic analysis/synthesis run.
///
/// All fields are required; [`crate::config::AnalysisSettings`] builds a value
/// from `config.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Analysis window samples (odd length, normalized internally)
    pub window: Vec<f64>,
    /// Analysis FFT size
    pub fft_size: usize,
    /// Peak detection threshold in dB (negative)
    pub threshold_db: f64,
    /// Maximum number of harmonics per frame
    pub max_harmonics: usize,
    /// Lower bound of the f0 search (Hz)
    pub min_f0: f64,
    /// Upper bound of the f0 search (Hz)
    pub max_f0: f64,
    /// Largest two-way mismatch error accepted for an f0 candidate
    pub f0_error_threshold: f64,
    /// Allowed harmonic deviation as a fraction of the harmonic frequency
    pub max_harmonic_deviation: f64,
}

impl ModelParams {
    /// Validates the parameters before any processing happens.
    ///
    /// # Returns
    /// * `Ok(())` if the parameters are usable
    /// * `Err(ModelError::InvalidParameter)` describing the first violation
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::InvalidParameter(msg));

        if self.sample_rate == 0 {
            return invalid("sample rate must be greater than zero".to_string());
        }
        if self.window.is_empty() || self.window.len() % 2 == 0 {
            return invalid(format!(
                "analysis window size must be odd, got {}",
                self.window.len()
            ));
        }
        if self.fft_size < MIN_FFT_SIZE {
            return invalid(format!(
                "FFT size must be at least {}, got {}",
                MIN_FFT_SIZE, self.fft_size
            ));
        }
        if self.window.len() > self.fft_size {
            return invalid(format!(
                "analysis window size ({}) exceeds FFT size ({})",
                self.window.len(),
                self.fft_size
            ));
        }
        let window_sum: f64 = self.window.iter().sum();
        if !window_sum.is_finite() || window_sum <= 0.0 {
            return invalid("analysis window must have a positive sum".to_string());
        }
        if !self.threshold_db.is_finite() {
            return invalid("peak threshold must be finite".to_string());
        }
        if self.max_harmonics == 0 {
            return invalid("maximum number of harmonics must be at least 1".to_string());
        }

        let nyquist = self.sample_rate as f64 / 2.0;
        if !self.min_f0.is_finite() || self.min_f0 < 0.0 {
            return invalid(format!("minimum f0 must be non-negative, got {}", self.min_f0));
        }
        if !self.max_f0.is_finite() || self.max_f0 <= self.min_f0 {
            return invalid(format!(
                "maximum f0 ({}) must be greater than minimum f0 ({})",
                self.max_f0, self.min_f0
            ));
        }
        if self.max_f0 >= nyquist {
            return invalid(format!(
                "maximum f0 ({:.1}Hz) must be below the Nyquist frequency ({:.1}Hz)",
                self.max_f0, nyquist
            ));
        }
        if !self.f0_error_threshold.is_finite() || self.f0_error_threshold <= 0.0 {
            return invalid("f0 error threshold must be positive".to_string());
        }
        if !self.max_harmonic_deviation.is_finite() || self.max_harmonic_deviation <= 0.0 {
            return invalid("maximum harmonic deviation must be positive".to_string());
        }

        Ok(())
    }

    /// Half size of the analysis window, `(M + 1) / 2`.
    #[inline]
    pub fn half_window(&self) -> usize {
        self.window.len().div_ceil(2)
    }
}
