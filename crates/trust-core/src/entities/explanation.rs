use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed contribution of one input feature to a decision score.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FeatureContribution {
    pub feature: String,
    /// The input value the contribution was computed from.
    pub value: serde_json::Value,
    pub contribution: f64,
}

/// Explanation content as produced by the explainer, before it is stored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ExplanationData {
    /// Ordered by absolute contribution, largest first.
    pub feature_contributions: Vec<FeatureContribution>,
    /// Always contains `overall_accuracy`.
    pub fairness_metrics: BTreeMap<String, f64>,
    pub summary: String,
    pub method: String,
}

impl ExplanationData {
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.fairness_metrics.get(name).copied()
    }
}

/// The stored explanation of a decision. At most one exists per decision.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Explanation {
    pub id: String,
    pub decision_id: String,
    pub feature_contributions: Vec<FeatureContribution>,
    pub fairness_metrics: BTreeMap<String, f64>,
    pub summary: String,
    pub method: String,
    pub created_at: DateTime<Utc>,
}

impl Explanation {
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.fairness_metrics.get(name).copied()
    }

    /// The explanation content without storage identity.
    #[must_use]
    pub fn data(&self) -> ExplanationData {
        ExplanationData {
            feature_contributions: self.feature_contributions.clone(),
            fairness_metrics: self.fairness_metrics.clone(),
            summary: self.summary.clone(),
            method: self.method.clone(),
        }
    }
}
