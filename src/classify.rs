//! Risk tiering of the model's probability output.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ClassifyError;
use crate::features::FeatureVector;
use crate::model::ScreeningModel;

/// Screening outcome tiers in increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Tier boundaries: above 0.7 is high, 0.4 and up is moderate.
    pub fn from_probability(p: f64) -> Self {
        if p > 0.7 {
            Self::High
        } else if p >= 0.4 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Low => "Continue regular screening",
            Self::Moderate => "Recommend follow-up monitoring",
            Self::High => "Recommend immediate evaluation",
        }
    }
}

/// Final screening verdict returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    /// Risk-class probability in [0, 1].
    pub probability: f64,
    /// Probability as a percentage, rounded to one decimal place.
    pub percentage: f64,
    pub label: &'static str,
    pub recommendation: &'static str,
    /// True when no model was loaded and the probability was drawn at
    /// random instead of predicted.
    pub simulated: bool,
}

impl RiskAssessment {
    fn from_probability(probability: f64, simulated: bool) -> Self {
        let tier = RiskTier::from_probability(probability);
        Self {
            probability,
            percentage: (probability * 1000.0).round() / 10.0,
            label: tier.label(),
            recommendation: tier.recommendation(),
            simulated,
        }
    }
}

/// Classify a feature vector, simulating when no model is available.
pub fn classify(
    features: &FeatureVector,
    model: Option<&ScreeningModel>,
) -> Result<RiskAssessment, ClassifyError> {
    match model {
        Some(model) => {
            let proba = model.predict_proba(features)?;
            debug!("Model probability: {:.4}", proba[1]);
            Ok(RiskAssessment::from_probability(proba[1], false))
        }
        None => {
            warn!("No screening model loaded, simulating a probability");
            let p = rand::thread_rng().gen_range(0.3..0.8);
            Ok(RiskAssessment::from_probability(p, true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskTier::from_probability(0.0), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.39), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.4), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(0.7), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(0.71), RiskTier::High);
        assert_eq!(RiskTier::from_probability(1.0), RiskTier::High);
    }

    #[test]
    fn test_labels_and_recommendations() {
        assert_eq!(RiskTier::Low.label(), "Low Risk");
        assert_eq!(RiskTier::Moderate.label(), "Moderate Risk");
        assert_eq!(RiskTier::High.label(), "High Risk");
        // Recommendation phrasing is part of the external contract.
        assert_eq!(RiskTier::Low.recommendation(), "Continue regular screening");
        assert_eq!(
            RiskTier::Moderate.recommendation(),
            "Recommend follow-up monitoring"
        );
        assert_eq!(
            RiskTier::High.recommendation(),
            "Recommend immediate evaluation"
        );
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        let a = RiskAssessment::from_probability(0.73456, false);
        assert_eq!(a.percentage, 73.5);
        assert_eq!(a.label, "High Risk");
        assert!(!a.simulated);
    }

    #[test]
    fn test_simulation_when_model_absent() {
        let features = FeatureVector::from_slice(&[0.0; FEATURE_COUNT]).unwrap();
        let a = classify(&features, None).unwrap();
        assert!(a.simulated);
        assert!((0.3..0.8).contains(&a.probability));
        assert!(!a.label.is_empty());
    }
}
