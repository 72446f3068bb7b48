//! Acoustic voice screening: perturbation features and risk classification.
//!
//! The pipeline turns a voice recording into a 26-dimension acoustic
//! feature vector (jitter, shimmer, harmonicity, pitch statistics,
//! voicing continuity) and scores it with a trained screening model.
//! Without a model artifact it still extracts real features but reports
//! a clearly-flagged simulated probability.

pub mod audio;
pub mod classify;
pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod pitch;
pub mod server;

pub use classify::{RiskAssessment, RiskTier};
pub use config::AnalysisConfig;
pub use error::{ClassifyError, IngestError};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use model::{ModelArtifact, ModelError, ScreeningModel};
pub use pipeline::{AnalysisReport, AnalyzeError, VoiceAnalyzer};
