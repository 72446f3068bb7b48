//! End-to-end analysis: bytes in, screening report out.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::audio::{ingest, Signal};
use crate::classify::{classify, RiskAssessment};
use crate::config::AnalysisConfig;
use crate::error::{ClassifyError, IngestError};
use crate::features::FeatureVector;
use crate::metrics::{PerturbationMetrics, SpectralMetrics, VoicingMetrics};
use crate::model::{ModelError, ScreeningModel};
use crate::pitch::{track, PitchStats};

/// Any failure an analysis request can surface.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// One named feature value in canonical order.
#[derive(Debug, Clone, Serialize)]
pub struct NamedFeature {
    pub name: &'static str,
    pub value: f64,
}

/// Headline numbers for callers that do not want the full vector.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub duration_s: f64,
    pub mean_pitch: f64,
    pub jitter_local: f64,
    pub shimmer_local: f64,
    pub hnr_db: f64,
    pub fraction_unvoiced: f64,
}

/// Full analysis response: verdict, features and summary.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub risk: RiskAssessment,
    pub features: Vec<NamedFeature>,
    pub summary: AnalysisSummary,
}

/// The analyzer owns the configuration and the (optional) model and is
/// shared across requests; extraction itself is stateless.
#[derive(Debug)]
pub struct VoiceAnalyzer {
    config: AnalysisConfig,
    model: Option<ScreeningModel>,
}

impl VoiceAnalyzer {
    pub fn new(config: AnalysisConfig, model: Option<ScreeningModel>) -> Self {
        Self { config, model }
    }

    /// Build an analyzer, loading the model from the configured path.
    ///
    /// A missing artifact is tolerated: the analyzer runs in simulation
    /// mode. Any other load failure (unreadable, unparsable, wrong
    /// dimension) is a startup error.
    pub fn from_config(config: AnalysisConfig) -> Result<Self, ModelError> {
        let path = config.resolved_model_path();
        let model = match ScreeningModel::load(&path) {
            Ok(model) => Some(model),
            Err(ModelError::NotFound(p)) => {
                warn!("No model artifact at {}, running in simulation mode", p);
                None
            }
            Err(err) => return Err(err),
        };
        Ok(Self::new(config, model))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Extract the feature vector from raw audio bytes.
    pub fn extract(&self, bytes: &[u8]) -> Result<FeatureVector, IngestError> {
        let signal = ingest(bytes, &self.config)?;
        Ok(self.extract_from_signal(&signal))
    }

    fn extract_from_signal(&self, signal: &Signal) -> FeatureVector {
        let (contour, pulses) = track(signal, &self.config);

        let stats = PitchStats::from_contour(&contour);
        let perturbation = PerturbationMetrics::compute(&pulses, signal, &self.config);
        let spectral = SpectralMetrics::compute(signal, &contour, &self.config);
        let voicing = VoicingMetrics::compute(&contour, &pulses, &self.config);

        FeatureVector::assemble(&stats, &perturbation, &spectral, &voicing)
    }

    /// Run the full pipeline: ingest, extract, classify, report.
    pub fn analyze(&self, bytes: &[u8]) -> Result<AnalysisReport, AnalyzeError> {
        let signal = ingest(bytes, &self.config)?;
        let features = self.extract_from_signal(&signal);
        let risk = classify(&features, self.model.as_ref())?;

        info!(
            "Analysis complete: {} ({:.1}%), {:.2}s of audio",
            risk.label,
            risk.percentage,
            signal.duration_s()
        );

        let values = features.values();
        let summary = AnalysisSummary {
            duration_s: signal.duration_s(),
            mean_pitch: values[15],
            jitter_local: values[0],
            shimmer_local: values[5],
            hnr_db: values[11],
            fraction_unvoiced: values[23],
        };

        Ok(AnalysisReport {
            risk,
            features: features
                .named()
                .map(|(name, value)| NamedFeature { name, value })
                .collect(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::io::Cursor;

    fn sine_wav_bytes(freq: f32, sample_rate: u32, duration_s: f32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let n = (sample_rate as f32 * duration_s) as usize;
        let mut buf = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for i in 0..n {
                let s = (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5;
                writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        buf
    }

    #[test]
    fn test_extract_produces_full_vector() {
        let analyzer = VoiceAnalyzer::new(AnalysisConfig::default(), None);
        let features = analyzer.extract(&sine_wav_bytes(200.0, 16_000, 1.0)).unwrap();

        assert!(features.values().iter().all(|v| v.is_finite()));
        // mean_pitch
        assert!((features.values()[15] - 200.0).abs() < 2.0);
        // A steady tone barely perturbs.
        assert!(features.values()[0] < 0.02, "jitter_local");
        assert!(features.values()[5] < 0.05, "shimmer_local");
    }

    #[test]
    fn test_extract_is_deterministic() {
        let analyzer = VoiceAnalyzer::new(AnalysisConfig::default(), None);
        let bytes = sine_wav_bytes(150.0, 16_000, 1.0);
        let a = analyzer.extract(&bytes).unwrap();
        let b = analyzer.extract(&bytes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_analyze_without_model_is_simulated() {
        let analyzer = VoiceAnalyzer::new(AnalysisConfig::default(), None);
        let report = analyzer.analyze(&sine_wav_bytes(200.0, 16_000, 1.0)).unwrap();

        assert!(report.risk.simulated);
        assert_eq!(report.features.len(), crate::features::FEATURE_COUNT);
        assert!((report.summary.duration_s - 1.0).abs() < 0.01);
        assert!((report.summary.mean_pitch - 200.0).abs() < 2.0);
    }

    #[test]
    fn test_analyze_propagates_ingest_errors() {
        let analyzer = VoiceAnalyzer::new(AnalysisConfig::default(), None);
        let err = analyzer.analyze(b"garbage").unwrap_err();
        assert!(matches!(err, AnalyzeError::Ingest(IngestError::Decode(_))));
    }

    #[test]
    fn test_from_config_missing_model_simulates() {
        let mut config = AnalysisConfig::default();
        config.model_path = Some("/nonexistent/model.json".into());
        let analyzer = VoiceAnalyzer::from_config(config).unwrap();
        assert!(!analyzer.model_loaded());
    }

    #[test]
    fn test_from_config_corrupt_model_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ broken").unwrap();

        let mut config = AnalysisConfig::default();
        config.model_path = Some(path);
        assert!(VoiceAnalyzer::from_config(config).is_err());
    }
}
