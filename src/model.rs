//! Screening model artifact: loading and probability prediction.
//!
//! The artifact is a JSON file tagged by kind. A logistic model carries
//! weights, a bias, and optional per-feature standardization; a hard-label
//! model only votes. The adapter normalizes both to a two-class
//! probability so the classifier never branches on model kind.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::error::ClassifyError;
use crate::features::{FeatureVector, FEATURE_COUNT};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found at {0}")]
    NotFound(String),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model expects {expected} features, artifact has {got} weights")]
    Dimension { expected: usize, got: usize },
}

/// On-disk model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Logistic regression over the (optionally standardized) features.
    Logistic {
        weights: Vec<f64>,
        bias: f64,
        #[serde(default)]
        means: Option<Vec<f64>>,
        #[serde(default)]
        scales: Option<Vec<f64>>,
    },
    /// Linear decision without calibrated probabilities; the predicted
    /// class gets the whole probability mass.
    HardLabel { weights: Vec<f64>, bias: f64 },
}

impl ModelArtifact {
    fn weights(&self) -> &[f64] {
        match self {
            Self::Logistic { weights, .. } | Self::HardLabel { weights, .. } => weights,
        }
    }
}

/// A validated, ready-to-predict screening model.
#[derive(Debug, Clone)]
pub struct ScreeningModel {
    artifact: ModelArtifact,
}

impl ScreeningModel {
    /// Load and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;
        let model = Self::from_artifact(artifact)?;
        info!("Loaded screening model from {}", path.display());
        Ok(model)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        let got = artifact.weights().len();
        if got != FEATURE_COUNT {
            return Err(ModelError::Dimension {
                expected: FEATURE_COUNT,
                got,
            });
        }
        if let ModelArtifact::Logistic { means, scales, .. } = &artifact {
            for aux in [means, scales].into_iter().flatten() {
                if aux.len() != FEATURE_COUNT {
                    return Err(ModelError::Dimension {
                        expected: FEATURE_COUNT,
                        got: aux.len(),
                    });
                }
            }
        }
        Ok(Self { artifact })
    }

    /// Two-class probabilities `[p_healthy, p_risk]`.
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], ClassifyError> {
        let values = features.values();

        match &self.artifact {
            ModelArtifact::Logistic {
                weights,
                bias,
                means,
                scales,
            } => {
                let mut z = *bias;
                for i in 0..FEATURE_COUNT {
                    let mut x = values[i];
                    if let Some(means) = means {
                        x -= means[i];
                    }
                    if let Some(scales) = scales {
                        if scales[i] > 0.0 {
                            x /= scales[i];
                        }
                    }
                    z += weights[i] * x;
                }
                let p = sigmoid(z);
                Ok([1.0 - p, p])
            }
            ModelArtifact::HardLabel { weights, bias } => {
                let z: f64 = bias
                    + weights
                        .iter()
                        .zip(values.iter())
                        .map(|(w, x)| w * x)
                        .sum::<f64>();
                Ok(if z > 0.0 { [0.0, 1.0] } else { [1.0, 0.0] })
            }
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
