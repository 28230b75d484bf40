//! Explainer: linear attribution over the decision's own model.
//!
//! The model re-evaluates the stored input, so an explanation can be produced
//! eagerly at decision time or lazily long after. Contributions are each
//! feature's weighted distance from the neutral baseline.

use std::collections::BTreeMap;
use trust_core::entities::{Decision, ExplanationData, FeatureContribution};

use crate::error::EngineError;
use crate::models::ModelRegistry;

pub const METHOD: &str = "linear_attribution";

pub const METRIC_OVERALL_ACCURACY: &str = "overall_accuracy";
pub const METRIC_PROTECTED_INFLUENCE: &str = "protected_feature_influence";
pub const METRIC_CONFIDENCE: &str = "confidence";
pub const METRIC_DECISION_MARGIN: &str = "decision_margin";

/// Features named in the summary.
const SUMMARY_FEATURES: usize = 3;

#[derive(Debug, Clone)]
pub struct Explainer {
    registry: ModelRegistry,
    protected_attributes: Vec<String>,
}

impl Explainer {
    #[must_use]
    pub const fn new(registry: ModelRegistry, protected_attributes: Vec<String>) -> Self {
        Self {
            registry,
            protected_attributes,
        }
    }

    /// Explain a stored decision.
    ///
    /// # Errors
    ///
    /// - `EngineError::UnsupportedDecisionType` if no model serves the type.
    /// - `EngineError::Internal` if the stored input no longer evaluates.
    pub fn explain(&self, decision: &Decision) -> Result<ExplanationData, EngineError> {
        let model = self.registry.get(decision.decision_type)?;
        let output = model.evaluate(&decision.input_data).map_err(|e| {
            EngineError::Internal(format!(
                "stored input for decision {} no longer evaluates: {e}",
                decision.id
            ))
        })?;

        let mut contributions = output.contributions.clone();
        contributions.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));

        let mut fairness_metrics = BTreeMap::new();
        fairness_metrics.insert(METRIC_OVERALL_ACCURACY.to_string(), model.reference_accuracy());
        fairness_metrics.insert(
            METRIC_PROTECTED_INFLUENCE.to_string(),
            self.protected_influence(&contributions),
        );
        fairness_metrics.insert(METRIC_CONFIDENCE.to_string(), decision.confidence_score);
        fairness_metrics.insert(METRIC_DECISION_MARGIN.to_string(), output.decision_margin());

        let summary = summarize(decision, &contributions, output.rule.as_deref());
        tracing::debug!(decision_id = %decision.id, "explainer: explanation generated");

        Ok(ExplanationData {
            feature_contributions: contributions,
            fairness_metrics,
            summary,
            method: METHOD.to_string(),
        })
    }

    /// Share of absolute attribution mass carried by protected features.
    #[must_use]
    pub fn protected_influence(&self, contributions: &[FeatureContribution]) -> f64 {
        let total: f64 = contributions.iter().map(|c| c.contribution.abs()).sum();
        if total <= f64::EPSILON {
            return 0.0;
        }
        let protected: f64 = contributions
            .iter()
            .filter(|c| self.protected_attributes.iter().any(|a| *a == c.feature))
            .map(|c| c.contribution.abs())
            .sum();
        protected / total
    }
}

fn summarize(decision: &Decision, contributions: &[FeatureContribution], rule: Option<&str>) -> String {
    let factors: Vec<String> = contributions
        .iter()
        .filter(|c| c.contribution.abs() > f64::EPSILON)
        .take(SUMMARY_FEATURES)
        .map(|c| {
            let direction = if c.contribution > 0.0 { "raised" } else { "lowered" };
            format!("{} {direction} the score by {:.3}", c.feature, c.contribution.abs())
        })
        .collect();

    let mut summary = format!(
        "The {} decision was '{}' with {:.0}% confidence.",
        decision.decision_type,
        decision.outcome,
        decision.confidence_score * 100.0
    );
    if let Some(rule) = rule {
        summary.push_str(&format!(" A policy rule applied: {rule}."));
    }
    if factors.is_empty() {
        summary.push_str(" No single factor stood out.");
    } else {
        summary.push_str(&format!(" Main factors: {}.", factors.join("; ")));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use trust_config::{BiasConfig, EngineConfig};
    use trust_core::enums::DecisionType;

    fn explainer() -> Explainer {
        Explainer::new(
            ModelRegistry::from_config(&EngineConfig::default()),
            BiasConfig::default().protected_attributes,
        )
    }

    fn decision(decision_type: DecisionType, outcome: &str, input: serde_json::Value) -> Decision {
        let now = Utc::now();
        Decision {
            id: "dec-test0001".into(),
            user_id: "usr-1".into(),
            decision_type,
            model_name: "m".into(),
            model_version: "1".into(),
            outcome: outcome.into(),
            confidence_score: 0.72,
            processing_time_ms: 1,
            input_data: input,
            metadata: json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn contributions_are_sorted_by_magnitude() {
        let data = explainer()
            .explain(&decision(
                DecisionType::LoanApproval,
                "denied",
                json!({"income": 20000, "requested_amount": 100000, "credit_score": 580}),
            ))
            .unwrap();
        let magnitudes: Vec<f64> = data
            .feature_contributions
            .iter()
            .map(|c| c.contribution.abs())
            .collect();
        assert!(magnitudes.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(data.feature_contributions[0].feature, "loan_to_income");
        assert_eq!(data.metric(METRIC_OVERALL_ACCURACY), Some(0.87));
        assert_eq!(data.metric(METRIC_PROTECTED_INFLUENCE), Some(0.0));
        assert_eq!(data.method, METHOD);
        assert!(data.summary.contains("'denied'"));
    }

    #[test]
    fn age_carries_protected_influence() {
        let data = explainer()
            .explain(&decision(
                DecisionType::RiskProfiling,
                "conservative",
                json!({"age": 80, "investment_horizon_years": 2, "loss_tolerance": 0.1}),
            ))
            .unwrap();
        let influence = data.metric(METRIC_PROTECTED_INFLUENCE).unwrap();
        assert!(influence > 0.0 && influence < 1.0);
    }

    #[test]
    fn corrupted_input_is_internal() {
        let err = explainer()
            .explain(&decision(DecisionType::LoanApproval, "denied", json!({"income": 1})))
            .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }
}
