//! Error taxonomy for the analysis pipeline.
//!
//! Only two kinds of failure reach a caller:
//! - [`IngestError`] — the input audio could not be turned into a usable
//!   signal (undecodable bytes, too little audio). Fatal to the request.
//! - [`ClassifyError`] — the feature vector handed to the classifier had
//!   the wrong shape. This is a contract violation between the assembler
//!   and the adapter and should never occur in correct operation.
//!
//! Per-metric numeric failures are not errors: metric functions return
//! `Option` and the assembler substitutes 0.0, logging the substitution.

use thiserror::Error;

/// Errors raised while turning raw audio bytes into a [`crate::audio::Signal`].
#[derive(Debug, Error)]
pub enum IngestError {
    /// The byte stream could not be decoded as PCM audio.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// The decoded audio is shorter than the minimum analysis duration.
    ///
    /// Pitch and jitter estimators need multiple glottal cycles to be
    /// statistically meaningful; shorter input produces degenerate metrics.
    #[error("audio duration {duration_s:.2}s is below the {min_s:.1}s minimum required for analysis")]
    TooShort { duration_s: f64, min_s: f64 },

    /// Resampling to the analysis rate failed.
    #[error("audio resampling failed: {0}")]
    Resample(String),
}

/// Errors raised by the classifier adapter.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The feature vector does not have the arity the model was fit on.
    #[error("feature vector has {got} elements, expected {expected}")]
    FeatureShape { expected: usize, got: usize },
}
