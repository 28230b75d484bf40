//! Response types returned by governed operations and printed by `trustai`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{
    AuditLog, BiasAlert, Consent, Decision, DecisionOverride, Explanation,
};
use crate::enums::{Channel, DecisionType, Severity};

/// A notification the delivery layer may send. The core only computes these.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NotificationIntent {
    pub user_id: String,
    pub decision_id: String,
    pub channel: Channel,
    pub severity: Severity,
    pub message: String,
}

/// Result of simulating a decision.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DecisionOutcome {
    pub decision: Decision,
    /// `None` when eager explanation failed; it is generated on the next
    /// explain request.
    pub explanation: Option<Explanation>,
    pub bias_alerts: Vec<BiasAlert>,
    pub notifications: Vec<NotificationIntent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Result of overriding a decision.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct OverrideOutcome {
    pub decision: Decision,
    pub override_record: DecisionOverride,
}

/// Favorable-outcome rates for one decision type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DecisionTypeFairness {
    pub decision_type: DecisionType,
    pub total: u32,
    pub favorable_rate: f64,
    /// Attribute -> lowest group rate / highest group rate, for attributes
    /// where at least two groups meet the minimum sample size.
    pub disparate_impact: BTreeMap<String, f64>,
}

/// Aggregate fairness view for compliance dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BiasMetricsSnapshot {
    pub open_alerts_by_severity: BTreeMap<String, u32>,
    pub alerts_by_status: BTreeMap<String, u32>,
    pub average_accuracy: Option<f64>,
    /// `average_accuracy` as an integer percentage, 0 when unknown.
    pub fairness_score: u32,
    pub decision_types: Vec<DecisionTypeFairness>,
    pub generated_at: DateTime<Utc>,
}

/// Dashboard counters, system-wide or for one user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DashboardStats {
    /// `None` for system-wide statistics.
    pub user_id: Option<String>,
    pub total_decisions: u64,
    pub decisions_24h: u64,
    pub granted_consents: u64,
    pub consents_24h: u64,
    pub open_alerts: u64,
    pub critical_alerts: u64,
    pub fairness_score: u32,
    /// Decisions per hour for the last 24 hours, oldest first.
    pub hourly_decisions: Vec<u64>,
    pub last_updated: DateTime<Utc>,
}

/// Usage figures for one registered model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ModelPerformance {
    pub decision_type: DecisionType,
    pub model_name: String,
    pub model_version: String,
    pub reference_accuracy: f64,
    pub decisions: u64,
    /// `None` until the model has made a decision.
    pub average_confidence: Option<f64>,
    pub favorable_rate: Option<f64>,
    /// Open or investigating alerts raised on this model's decisions.
    pub open_alerts: u64,
}

/// Snapshot of governed data for offline review.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ExportBundle {
    pub decisions: Vec<Decision>,
    pub consents: Vec<Consent>,
    pub overrides: Vec<DecisionOverride>,
    pub bias_alerts: Vec<BiasAlert>,
    pub audit_logs: Vec<AuditLog>,
    pub exported_at: DateTime<Utc>,
}
