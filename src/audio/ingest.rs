//! Ingest contract: raw bytes in, validated [`Signal`] out.

use tracing::debug;

use super::{decode_wav, resample, Signal};
use crate::config::AnalysisConfig;
use crate::error::IngestError;

/// Decode, validate and normalize a raw audio byte stream.
///
/// The duration gate runs on the decoded audio before resampling: the
/// bound exists because pitch and jitter estimators need multiple glottal
/// cycles, and resampling does not change the duration.
pub fn ingest(bytes: &[u8], config: &AnalysisConfig) -> Result<Signal, IngestError> {
    let (samples, source_rate) = decode_wav(bytes)?;

    let duration_s = samples.len() as f64 / source_rate as f64;
    if duration_s < config.min_duration_s {
        return Err(IngestError::TooShort {
            duration_s,
            min_s: config.min_duration_s,
        });
    }

    let samples = resample(&samples, source_rate, config.target_sample_rate)?;
    debug!(
        "Ingested {:.2}s of audio at {} Hz",
        duration_s, config.target_sample_rate
    );

    Ok(Signal::new(samples, config.target_sample_rate))
}
