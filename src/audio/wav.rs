use super::types::{AudioError, WavData};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Full-scale value of 16-bit PCM output.
const PCM16_SCALE: f32 = 32768.0;

/// Sample formats accepted by [`read_wav_file`].
pub const SUPPORTED_FORMATS: &str = "16/24/32-bit integer PCM and 32-bit float";

/// Reads a WAV file into normalized f32 samples, channels interleaved.
///
/// Integer PCM is divided by its full-scale value so every format lands in
/// [-1, 1]. Anything other than [`SUPPORTED_FORMATS`] fails with
/// `WavParse`.
pub fn read_wav_file(path: &Path) -> Result<WavData, AudioError> {
    let reader = WavReader::open(path).map_err(|e| AudioError::WavParse(e.to_string()))?;
    let spec = reader.spec();

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => decode::<f32>(reader, 1.0)?,
        (SampleFormat::Int, 16) => decode::<i16>(reader, (1u32 << 15) as f32)?,
        (SampleFormat::Int, 24) => decode::<i32>(reader, (1u32 << 23) as f32)?,
        (SampleFormat::Int, 32) => decode::<i32>(reader, (1u64 << 31) as f32)?,
        (format, bits) => {
            return Err(AudioError::WavParse(format!(
                "{:?} {}-bit samples are not supported (expected {})",
                format, bits, SUPPORTED_FORMATS
            )))
        }
    };

    tracing::debug!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        samples = samples.len(),
        "read WAV file"
    );

    Ok(WavData {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

fn decode<S>(reader: WavReader<BufReader<File>>, full_scale: f32) -> Result<Vec<f32>, AudioError>
where
    S: hound::Sample + Into<f64>,
{
    let scale = 1.0 / full_scale as f64;
    reader
        .into_samples::<S>()
        .map(|s| {
            s.map(|v| (v.into() * scale) as f32)
                .map_err(|e| AudioError::WavParse(e.to_string()))
        })
        .collect()
}

/// Writes a mono signal as a 16-bit PCM WAV file.
///
/// Samples are clamped to [-1, 1], scaled by 2^15 and truncated toward zero.
///
/// # Arguments
/// * `path` - Destination file
/// * `samples` - Normalized mono samples
/// * `sample_rate` - Sample rate in Hz
///
/// # Errors
/// * If the sample rate is zero
/// * If the file cannot be created or finalized
pub fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AudioError> {
    if sample_rate == 0 {
        return Err(AudioError::InvalidParams(
            "Sample rate must be greater than zero".to_string(),
        ));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| AudioError::WavWrite(e.to_string()))?;
    for &sample in samples {
        writer
            .write_sample(to_pcm16(sample))
            .map_err(|e| AudioError::WavWrite(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| AudioError::WavWrite(e.to_string()))?;

    tracing::debug!(path = %path.display(), samples = samples.len(), "wrote WAV file");
    Ok(())
}

fn to_pcm16(sample: f32) -> i16 {
    let scaled = (sample.clamp(-1.0, 1.0) * PCM16_SCALE).trunc();
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm16_conversion_truncates_and_clamps() {
        assert_eq!(to_pcm16(0.0), 0);
        assert_eq!(to_pcm16(0.5), 16384);
        assert_eq!(to_pcm16(-0.5), -16384);
        // 1.0 * 2^15 overflows i16 and must saturate
        assert_eq!(to_pcm16(1.0), i16::MAX);
        assert_eq!(to_pcm16(-1.0), i16::MIN);
        assert_eq!(to_pcm16(3.0), i16::MAX);
        // Truncation, not rounding
        assert_eq!(to_pcm16(0.99999 / 32768.0), 0);
    }
}
