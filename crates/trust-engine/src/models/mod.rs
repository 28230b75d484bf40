//! Simulated decision models, one per decision type.
//!
//! Every model is a deterministic weighted score over normalized input
//! features. The same weights drive both the outcome and the explanation, so
//! attributions always agree with the decision they explain.

mod fraud;
mod loan;
mod offer;
mod risk;

pub use fraud::FraudDetectionModel;
pub use loan::LoanApprovalModel;
pub use offer::OfferPropensityModel;
pub use risk::RiskProfileModel;

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use trust_config::EngineConfig;
use trust_core::entities::FeatureContribution;
use trust_core::enums::DecisionType;

use crate::error::EngineError;

/// Normalized feature value treated as "no influence" in attributions.
pub const NEUTRAL_BASELINE: f64 = 0.5;

/// What a model concluded about one input.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Weighted score in [0, 1].
    pub score: f64,
    pub outcome: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Thresholds the score was compared against, ascending.
    pub boundaries: Vec<f64>,
    /// Signed weighted contributions relative to [`NEUTRAL_BASELINE`], in
    /// model feature order.
    pub contributions: Vec<FeatureContribution>,
    /// Rule that short-circuited the score, if any.
    pub rule: Option<String>,
}

impl ModelOutput {
    /// Distance from the score to the nearest decision boundary.
    #[must_use]
    pub fn decision_margin(&self) -> f64 {
        self.boundaries
            .iter()
            .map(|b| (self.score - b).abs())
            .fold(f64::INFINITY, f64::min)
            .min(1.0)
    }
}

/// A simulated model serving exactly one decision type.
pub trait DecisionModel: Send + Sync {
    fn decision_type(&self) -> DecisionType;

    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Holdout accuracy reported as the `overall_accuracy` fairness metric.
    fn reference_accuracy(&self) -> f64;

    /// Score one input payload.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for missing, ill-typed, or
    /// out-of-range fields.
    fn evaluate(&self, input: &Value) -> Result<ModelOutput, EngineError>;
}

/// Lookup from decision type to its model.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<DecisionType, Arc<dyn DecisionModel>>,
}

impl ModelRegistry {
    /// The four built-in models with thresholds from `config`.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(LoanApprovalModel::from_config(config)));
        registry.register(Arc::new(FraudDetectionModel::from_config(config)));
        registry.register(Arc::new(OfferPropensityModel::from_config(config)));
        registry.register(Arc::new(RiskProfileModel::from_config(config)));
        registry
    }

    /// Add or replace the model for its decision type.
    pub fn register(&mut self, model: Arc<dyn DecisionModel>) {
        self.models.insert(model.decision_type(), model);
    }

    /// # Errors
    ///
    /// Returns `EngineError::UnsupportedDecisionType` when no model is registered.
    pub fn get(&self, decision_type: DecisionType) -> Result<&dyn DecisionModel, EngineError> {
        self.models
            .get(&decision_type)
            .map(AsRef::as_ref)
            .ok_or_else(|| EngineError::UnsupportedDecisionType(decision_type.to_string()))
    }

    /// Registered models in decision type order.
    #[must_use]
    pub fn models(&self) -> Vec<&dyn DecisionModel> {
        DecisionType::ALL
            .iter()
            .filter_map(|t| self.models.get(t).map(AsRef::as_ref))
            .collect()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.models.values().map(|m| m.name()).collect();
        names.sort_unstable();
        f.debug_struct("ModelRegistry").field("models", &names).finish()
    }
}

pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Confidence for banded outcomes: half plus the distance to the nearest boundary.
pub(crate) fn band_confidence(score: f64, boundaries: &[f64]) -> f64 {
    let margin = boundaries
        .iter()
        .map(|b| (score - b).abs())
        .fold(f64::INFINITY, f64::min);
    clamp01(0.5 + margin)
}

pub(crate) fn contribution(
    feature: &str,
    value: Value,
    weight: f64,
    normalized: f64,
) -> FeatureContribution {
    FeatureContribution {
        feature: feature.to_string(),
        value,
        contribution: weight * (normalized - NEUTRAL_BASELINE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_decision_type() {
        let registry = ModelRegistry::from_config(&EngineConfig::default());
        for decision_type in DecisionType::ALL {
            let model = registry.get(decision_type).unwrap();
            assert_eq!(model.decision_type(), decision_type);
            assert!((0.0..=1.0).contains(&model.reference_accuracy()));
        }
    }

    #[test]
    fn empty_registry_reports_unsupported() {
        let registry = ModelRegistry::default();
        let err = registry.get(DecisionType::LoanApproval).err().unwrap();
        assert!(matches!(err, EngineError::UnsupportedDecisionType(_)));
        assert!(registry.models().is_empty());
    }

    #[test]
    fn models_follow_decision_type_order() {
        let registry = ModelRegistry::from_config(&EngineConfig::default());
        let types: Vec<DecisionType> = registry.models().iter().map(|m| m.decision_type()).collect();
        assert_eq!(types, DecisionType::ALL.to_vec());
    }

    #[test]
    fn band_confidence_is_bounded() {
        assert!((band_confidence(0.45, &[0.3, 0.6]) - 0.65).abs() < 1e-9);
        assert!((band_confidence(1.0, &[0.0]) - 1.0).abs() < 1e-9);
    }
}
