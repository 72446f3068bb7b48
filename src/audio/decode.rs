//! WAV decoding and mono downmix.
//!
//! The upstream transcoder converts arbitrary containers to PCM WAV; this
//! module only has to turn those bytes into normalized f32 samples.

use std::io::Cursor;

use hound::SampleFormat;
use tracing::debug;

use crate::error::IngestError;

/// Decode a WAV byte stream into mono f32 samples plus the source rate.
///
/// Multi-channel input is collapsed by averaging each frame across
/// channels. Integer PCM (16/24/32-bit) is normalized to [-1, 1].
pub fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32), IngestError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| IngestError::Decode(e.to_string()))?;

    let spec = reader.spec();
    debug!(
        "Decoding WAV: {} Hz, {} ch, {} bit {:?}",
        spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    );

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| IngestError::Decode(e.to_string()))?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| IngestError::Decode(e.to_string()))?
        }
    };

    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(IngestError::Decode("WAV declares zero channels".into()));
    }

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}
