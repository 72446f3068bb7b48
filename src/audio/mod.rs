//! Audio ingest: decode, downmix, resample, validate.
//!
//! The pipeline operates on a [`Signal`]: mono f32 samples at the
//! configured analysis rate. [`ingest::ingest`] is the only way to build
//! one from raw bytes, so every downstream stage can assume the rate and
//! channel layout are already normalized.

mod decode;
mod ingest;
mod resampler;

pub use decode::decode_wav;
pub use ingest::ingest;
pub use resampler::resample;

/// A mono PCM signal at a known sample rate.
///
/// Owned by a single pipeline invocation and dropped once extraction
/// completes; there is no shared state between requests.
#[derive(Debug, Clone)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Signal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
