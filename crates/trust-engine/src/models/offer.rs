use serde_json::{Value, json};
use trust_config::EngineConfig;
use trust_core::enums::DecisionType;

use super::{DecisionModel, ModelOutput, band_confidence, clamp01, contribution};
use crate::error::EngineError;
use crate::payload::{Bounds, InputReader};

const BALANCE_WEIGHT: f64 = 0.5;
const TENURE_WEIGHT: f64 = 0.3;
const SPEND_WEIGHT: f64 = 0.2;
const BALANCE_SCALE: f64 = 50_000.0;
const SPEND_SCALE: f64 = 5_000.0;

/// Logistic-regression offer propensity stand-in.
#[derive(Debug, Clone)]
pub struct OfferPropensityModel {
    premium_threshold: f64,
    standard_threshold: f64,
}

impl OfferPropensityModel {
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self {
            premium_threshold: config.offer_premium_threshold,
            standard_threshold: config.offer_standard_threshold,
        }
    }
}

impl DecisionModel for OfferPropensityModel {
    fn decision_type(&self) -> DecisionType {
        DecisionType::PersonalizedOffer
    }

    fn name(&self) -> &'static str {
        "offer_propensity_lr"
    }

    fn version(&self) -> &'static str {
        "1.1.0"
    }

    fn reference_accuracy(&self) -> f64 {
        0.81
    }

    fn evaluate(&self, input: &Value) -> Result<ModelOutput, EngineError> {
        let reader = InputReader::new(input)?;
        let balance = reader.required_f64("account_balance", Bounds::NON_NEGATIVE)?;
        let tenure_years = reader.optional_f64("tenure_years", 0.0, Bounds::NON_NEGATIVE)?;
        let spend = reader.optional_f64("monthly_spend", 0.0, Bounds::NON_NEGATIVE)?;

        let wealth = (balance / BALANCE_SCALE).min(1.0);
        let loyalty = (tenure_years / 10.0).min(1.0);
        let activity = (spend / SPEND_SCALE).min(1.0);
        let propensity = clamp01(
            BALANCE_WEIGHT * wealth + TENURE_WEIGHT * loyalty + SPEND_WEIGHT * activity,
        );

        let outcome = if propensity >= self.premium_threshold {
            "premium_offer"
        } else if propensity >= self.standard_threshold {
            "standard_offer"
        } else {
            "no_offer"
        };
        let boundaries = vec![self.standard_threshold, self.premium_threshold];

        Ok(ModelOutput {
            score: propensity,
            outcome: outcome.to_string(),
            confidence: band_confidence(propensity, &boundaries),
            boundaries,
            contributions: vec![
                contribution("account_balance", json!(balance), BALANCE_WEIGHT, wealth),
                contribution("tenure_years", json!(tenure_years), TENURE_WEIGHT, loyalty),
                contribution("monthly_spend", json!(spend), SPEND_WEIGHT, activity),
            ],
            rule: None,
        })
    }
}
