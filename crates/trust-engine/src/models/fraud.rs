use serde_json::{Value, json};
use trust_config::EngineConfig;
use trust_core::enums::DecisionType;

use super::{DecisionModel, ModelOutput, clamp01, contribution};
use crate::error::EngineError;
use crate::payload::{Bounds, InputReader};

const SPIKE_WEIGHT: f64 = 0.4;
const FOREIGN_WEIGHT: f64 = 0.2;
const NIGHT_WEIGHT: f64 = 0.2;
const VELOCITY_WEIGHT: f64 = 0.2;
/// Hours before this count as night-time activity.
const NIGHT_ENDS_AT: f64 = 6.0;

/// Isolation-forest fraud scoring stand-in.
#[derive(Debug, Clone)]
pub struct FraudDetectionModel {
    flag_threshold: f64,
}

impl FraudDetectionModel {
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self {
            flag_threshold: config.fraud_flag_threshold,
        }
    }
}

impl DecisionModel for FraudDetectionModel {
    fn decision_type(&self) -> DecisionType {
        DecisionType::FraudDetection
    }

    fn name(&self) -> &'static str {
        "fraud_detection_iforest"
    }

    fn version(&self) -> &'static str {
        "1.4.1"
    }

    fn reference_accuracy(&self) -> f64 {
        0.92
    }

    fn evaluate(&self, input: &Value) -> Result<ModelOutput, EngineError> {
        let reader = InputReader::new(input)?;
        let amount = reader.required_f64("amount", Bounds::NON_NEGATIVE)?;
        let default_avg = if amount > 0.0 { amount } else { 1.0 };
        let average = reader.optional_f64("avg_transaction_amount", default_avg, Bounds::POSITIVE)?;
        let foreign = reader.optional_bool("is_foreign", false)?;
        let hour = reader.optional_f64("hour_of_day", 12.0, Bounds::between(0.0, 23.0))?;
        let recent = reader.optional_f64("transactions_last_hour", 0.0, Bounds::NON_NEGATIVE)?;

        let ratio = amount / average;
        let spike = (ratio / 5.0).min(1.0);
        let foreign_signal = if foreign { 1.0 } else { 0.0 };
        let night = if hour < NIGHT_ENDS_AT { 1.0 } else { 0.0 };
        let velocity = (recent / 10.0).min(1.0);
        let risk = clamp01(
            SPIKE_WEIGHT * spike
                + FOREIGN_WEIGHT * foreign_signal
                + NIGHT_WEIGHT * night
                + VELOCITY_WEIGHT * velocity,
        );

        let (outcome, confidence) = if risk >= self.flag_threshold {
            ("flagged", risk)
        } else {
            ("cleared", 1.0 - risk)
        };

        Ok(ModelOutput {
            score: risk,
            outcome: outcome.to_string(),
            confidence: clamp01(confidence),
            boundaries: vec![self.flag_threshold],
            contributions: vec![
                contribution("amount_spike", json!(ratio), SPIKE_WEIGHT, spike),
                contribution("is_foreign", json!(foreign), FOREIGN_WEIGHT, foreign_signal),
                contribution("hour_of_day", json!(hour), NIGHT_WEIGHT, night),
                contribution("transactions_last_hour", json!(recent), VELOCITY_WEIGHT, velocity),
            ],
            rule: None,
        })
    }
}
