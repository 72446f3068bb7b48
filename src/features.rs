//! The 26-dimension acoustic feature vector.
//!
//! Index order is a stable contract shared with trained model artifacts;
//! reordering or renaming entries invalidates every saved model.

use serde::Serialize;
use tracing::warn;

use crate::error::ClassifyError;
use crate::metrics::{PerturbationMetrics, SpectralMetrics, VoicingMetrics};
use crate::pitch::PitchStats;

pub const FEATURE_COUNT: usize = 26;

/// Canonical feature names, index-aligned with [`FeatureVector`].
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "jitter_local",
    "jitter_abs",
    "jitter_rap",
    "jitter_ppq5",
    "jitter_ddp",
    "shimmer_local",
    "shimmer_db",
    "shimmer_apq3",
    "shimmer_apq5",
    "shimmer_apq11",
    "shimmer_dda",
    "hnr",
    "noise_to_harmonic",
    "harmonic_to_noise",
    "median_pitch",
    "mean_pitch",
    "std_pitch",
    "min_pitch",
    "max_pitch",
    "pulse_count",
    "period_count",
    "mean_period",
    "sd_period",
    "fraction_unvoiced",
    "num_voice_breaks",
    "degree_voice_breaks",
];

/// Fixed-order feature vector; every value is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build from a slice, checking shape and replacing non-finite values.
    pub fn from_slice(values: &[f64]) -> Result<Self, ClassifyError> {
        if values.len() != FEATURE_COUNT {
            return Err(ClassifyError::FeatureShape {
                expected: FEATURE_COUNT,
                got: values.len(),
            });
        }
        let mut array = [0.0; FEATURE_COUNT];
        for (i, &v) in values.iter().enumerate() {
            array[i] = sanitize(v, FEATURE_NAMES[i]);
        }
        Ok(Self(array))
    }

    /// Assemble the vector from the per-family metric results.
    ///
    /// Unmeasurable metrics (`None`) become 0.0 so the vector always has
    /// the full shape; each substitution is logged by feature name.
    pub fn assemble(
        stats: &PitchStats,
        perturbation: &PerturbationMetrics,
        spectral: &SpectralMetrics,
        voicing: &VoicingMetrics,
    ) -> Self {
        let values = [
            fill(perturbation.jitter_local, "jitter_local"),
            fill(perturbation.jitter_abs, "jitter_abs"),
            fill(perturbation.jitter_rap, "jitter_rap"),
            fill(perturbation.jitter_ppq5, "jitter_ppq5"),
            fill(perturbation.jitter_ddp, "jitter_ddp"),
            fill(perturbation.shimmer_local, "shimmer_local"),
            fill(perturbation.shimmer_db, "shimmer_db"),
            fill(perturbation.shimmer_apq3, "shimmer_apq3"),
            fill(perturbation.shimmer_apq5, "shimmer_apq5"),
            fill(perturbation.shimmer_apq11, "shimmer_apq11"),
            fill(perturbation.shimmer_dda, "shimmer_dda"),
            fill(spectral.hnr, "hnr"),
            fill(spectral.noise_to_harmonic, "noise_to_harmonic"),
            fill(spectral.harmonic_to_noise, "harmonic_to_noise"),
            fill(stats.median_pitch, "median_pitch"),
            fill(stats.mean_pitch, "mean_pitch"),
            fill(stats.std_pitch, "std_pitch"),
            fill(stats.min_pitch, "min_pitch"),
            fill(stats.max_pitch, "max_pitch"),
            voicing.pulse_count as f64,
            voicing.period_count as f64,
            fill(voicing.mean_period, "mean_period"),
            fill(voicing.sd_period, "sd_period"),
            sanitize(voicing.fraction_unvoiced, "fraction_unvoiced"),
            voicing.num_voice_breaks as f64,
            sanitize(voicing.degree_voice_breaks, "degree_voice_breaks"),
        ];
        Self(values)
    }

    #[inline]
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Name/value pairs in canonical order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

fn fill(value: Option<f64>, name: &str) -> f64 {
    match value {
        Some(v) => sanitize(v, name),
        None => {
            warn!("Feature '{}' not measurable, substituting 0.0", name);
            0.0
        }
    }
}

fn sanitize(value: f64, name: &str) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!("Feature '{}' is non-finite, substituting 0.0", name);
        0.0
    }
}
