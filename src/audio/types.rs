/// Represents the data from a WAV file after reading
#[derive(Debug)]
pub struct WavData {
    /// Interleaved samples normalized to [-1, 1] range
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: u16,
}

/// Errors that can occur during audio file handling
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// IO errors when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during WAV file parsing
    #[error("WAV parsing error: {0}")]
    WavParse(String),

    /// Errors while encoding or finalizing a WAV file
    #[error("WAV writing error: {0}")]
    WavWrite(String),

    /// Invalid parameter values
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

impl WavData {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration of the recording in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Extracts a mono signal by averaging all channels of each frame.
    ///
    /// # Returns
    /// * `Ok(Vec<f32>)` - One sample per frame
    /// * `Err(AudioError)` - If the channel count is zero
    pub fn to_mono(&self) -> Result<Vec<f32>, AudioError> {
        let channels = self.channels as usize;
        if channels == 0 {
            return Err(AudioError::InvalidParams(
                "WAV data reports zero channels".to_string(),
            ));
        }
        if channels == 1 {
            return Ok(self.samples.clone());
        }

        Ok(self
            .samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect())
    }
}
