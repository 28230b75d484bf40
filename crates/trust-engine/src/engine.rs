//! Decision Engine: routes a request to its model and times the evaluation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Instant;
use trust_config::EngineConfig;
use trust_core::enums::DecisionType;

use crate::error::EngineError;
use crate::models::ModelRegistry;

/// Outcome of one engine evaluation, ready to be persisted as a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision_type: DecisionType,
    pub outcome: String,
    pub confidence: f64,
    pub model_name: String,
    pub model_version: String,
    pub processing_time_ms: u64,
    /// Score, boundaries, and any short-circuit rule.
    pub metadata: Value,
}

/// Side-effect free decision maker. Repeated calls with the same input differ
/// only in `processing_time_ms`.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    registry: ModelRegistry,
}

impl DecisionEngine {
    #[must_use]
    pub const fn new(registry: ModelRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(ModelRegistry::from_config(config))
    }

    #[must_use]
    pub const fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Evaluate `input` with the model for `decision_type`.
    ///
    /// # Errors
    ///
    /// - `EngineError::UnsupportedDecisionType` if the type is unknown.
    /// - `EngineError::Validation` if the payload is not an object or a field
    ///   is missing, ill-typed, or out of range.
    pub fn make_decision(
        &self,
        decision_type: &str,
        input: &Value,
        subject_user_id: &str,
    ) -> Result<DecisionResult, EngineError> {
        let parsed: DecisionType = decision_type
            .parse()
            .map_err(|_| EngineError::UnsupportedDecisionType(decision_type.to_string()))?;
        let model = self.registry.get(parsed)?;

        let started = Instant::now();
        let output = model.evaluate(input)?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(
            decision_type = %parsed,
            subject = subject_user_id,
            model = model.name(),
            outcome = %output.outcome,
            confidence = output.confidence,
            "engine: decision evaluated"
        );

        let mut metadata = json!({
            "score": output.score,
            "decision_margin": output.decision_margin(),
            "boundaries": output.boundaries,
        });
        if let (Some(rule), Some(obj)) = (&output.rule, metadata.as_object_mut()) {
            obj.insert("rule".into(), Value::String(rule.clone()));
        }

        Ok(DecisionResult {
            decision_type: parsed,
            outcome: output.outcome,
            confidence: output.confidence,
            model_name: model.name().to_string(),
            model_version: model.version().to_string(),
            processing_time_ms: elapsed_ms,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DecisionEngine {
        DecisionEngine::from_config(&EngineConfig::default())
    }

    #[test]
    fn alias_routes_to_canonical_model() {
        let result = engine()
            .make_decision("fraud_check", &json!({"amount": 10}), "usr-1")
            .unwrap();
        assert_eq!(result.decision_type, DecisionType::FraudDetection);
        assert_eq!(result.model_name, "fraud_detection_iforest");
        assert_eq!(result.model_version, "1.4.1");
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let err = engine()
            .make_decision("mortgage", &json!({}), "usr-1")
            .unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedDecisionType(ref t) if t == "mortgage"));
    }

    #[test]
    fn hard_denial_rule_lands_in_metadata() {
        let result = engine()
            .make_decision(
                "loan_approval",
                &json!({"income": 10000, "requested_amount": 150000, "credit_score": 700}),
                "usr-1",
            )
            .unwrap();
        assert_eq!(result.outcome, "denied");
        assert!(result.metadata["rule"].as_str().unwrap().contains("loan_to_income"));
    }
}
