use serde_json::{Value, json};
use trust_config::EngineConfig;
use trust_core::enums::DecisionType;

use super::{DecisionModel, ModelOutput, band_confidence, clamp01, contribution};
use crate::error::EngineError;
use crate::payload::{Bounds, InputReader};

const TOLERANCE_WEIGHT: f64 = 0.4;
const HORIZON_WEIGHT: f64 = 0.4;
const AGE_WEIGHT: f64 = 0.2;

/// Investment risk profile scorer. Uses `age`, so its attributions carry
/// protected-feature influence.
#[derive(Debug, Clone)]
pub struct RiskProfileModel {
    aggressive_threshold: f64,
    moderate_threshold: f64,
}

impl RiskProfileModel {
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self {
            aggressive_threshold: config.risk_aggressive_threshold,
            moderate_threshold: config.risk_moderate_threshold,
        }
    }
}

impl DecisionModel for RiskProfileModel {
    fn decision_type(&self) -> DecisionType {
        DecisionType::RiskProfiling
    }

    fn name(&self) -> &'static str {
        "risk_profile_scorer"
    }

    fn version(&self) -> &'static str {
        "3.0.2"
    }

    fn reference_accuracy(&self) -> f64 {
        0.78
    }

    fn evaluate(&self, input: &Value) -> Result<ModelOutput, EngineError> {
        let reader = InputReader::new(input)?;
        let age = reader.required_f64("age", Bounds::between(18.0, 120.0))?;
        let horizon = reader.optional_f64("investment_horizon_years", 5.0, Bounds::NON_NEGATIVE)?;
        let tolerance = reader.optional_f64("loss_tolerance", 0.5, Bounds::between(0.0, 1.0))?;

        let youth = 1.0 - ((age - 25.0).max(0.0) / 50.0).min(1.0);
        let reach = (horizon / 20.0).min(1.0);
        let score =
            clamp01(TOLERANCE_WEIGHT * tolerance + HORIZON_WEIGHT * reach + AGE_WEIGHT * youth);

        let outcome = if score >= self.aggressive_threshold {
            "aggressive"
        } else if score >= self.moderate_threshold {
            "moderate"
        } else {
            "conservative"
        };
        let boundaries = vec![self.moderate_threshold, self.aggressive_threshold];

        Ok(ModelOutput {
            score,
            outcome: outcome.to_string(),
            confidence: band_confidence(score, &boundaries),
            boundaries,
            contributions: vec![
                contribution("loss_tolerance", json!(tolerance), TOLERANCE_WEIGHT, tolerance),
                contribution("investment_horizon_years", json!(horizon), HORIZON_WEIGHT, reach),
                contribution("age", json!(age), AGE_WEIGHT, youth),
            ],
            rule: None,
        })
    }
}
