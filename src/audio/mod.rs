/// Audio input/output for the harmonic model.
///
/// This module provides functionality to:
/// - Read WAV files into normalized sample buffers
/// - Downmix multi-channel recordings to mono
/// - Write resynthesized signals back to 16-bit WAV files
mod types;
mod wav;

pub use types::{AudioError, WavData};
pub use wav::{read_wav_file, write_wav_file, SUPPORTED_FORMATS};
