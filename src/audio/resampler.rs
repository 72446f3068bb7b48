//! Whole-buffer resampling to the analysis rate.

use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use crate::error::IngestError;

/// Fixed input chunk size for the FFT resampler.
const CHUNK_SIZE: usize = 1024;

/// Resample a mono buffer from `from_rate` to `to_rate`.
///
/// The FFT resampler introduces a processing delay; the output is
/// compensated for it and trimmed to the expected length, so the result
/// lines up with the input in time.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, IngestError> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    debug!(
        "Resampling {} samples: {} Hz -> {} Hz",
        samples.len(),
        from_rate,
        to_rate
    );

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        2, // sub_chunks for quality
        1, // mono
    )
    .map_err(|e| IngestError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let expected =
        (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;

    let mut input_buffer = vec![vec![0.0f32; CHUNK_SIZE]];
    let mut output_buffer = resampler.output_buffer_allocate(true);
    let mut out: Vec<f32> = Vec::with_capacity(expected + delay);
    let mut pos = 0usize;

    // Feed the signal chunk by chunk, then zero-flush until the delayed
    // tail has fully drained.
    while out.len() < delay + expected {
        let available = samples.len().saturating_sub(pos);
        let take = available.min(CHUNK_SIZE);
        input_buffer[0][..take].copy_from_slice(&samples[pos..pos + take]);
        input_buffer[0][take..].fill(0.0);
        pos += take;

        let (_, produced) = resampler
            .process_into_buffer(&input_buffer, &mut output_buffer, None)
            .map_err(|e| IngestError::Resample(e.to_string()))?;
        out.extend_from_slice(&output_buffer[0][..produced]);

        // Safety valve: a resampler that stops producing would loop forever.
        if take == 0 && produced == 0 {
            break;
        }
    }

    out.drain(..delay.min(out.len()));
    out.truncate(expected);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, duration_s: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * duration_s) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_same_rate_is_identity() {
        let input = sine(200.0, 16_000, 0.1);
        let output = resample(&input, 16_000, 16_000).unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn test_48k_to_16k_length() {
        let input = sine(200.0, 48_000, 1.0);
        let output = resample(&input, 48_000, 16_000).unwrap();
        assert_eq!(output.len(), 16_000);
    }

    #[test]
    fn test_44100_to_16k_preserves_tone() {
        let input = sine(200.0, 44_100, 1.0);
        let output = resample(&input, 44_100, 16_000).unwrap();
        assert_eq!(output.len(), 16_000);

        // The resampled tone should still carry real energy.
        let rms: f32 =
            (output.iter().map(|s| s * s).sum::<f32>() / output.len() as f32).sqrt();
        assert!(rms > 0.2, "Expected tone energy to survive, rms={rms}");
    }
}
