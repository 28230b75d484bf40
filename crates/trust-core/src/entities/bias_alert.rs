use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AlertType, DecisionType, InvestigationStatus, Severity};

/// A fairness alert raised by the bias screener and worked by compliance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BiasAlert {
    pub id: String,
    pub decision_id: String,
    pub decision_type: DecisionType,
    pub alert_type: AlertType,
    pub protected_attribute: Option<String>,
    pub metric_name: String,
    pub metric_value: f64,
    pub threshold: f64,
    pub severity: Severity,
    pub investigation_status: InvestigationStatus,
    pub description: String,
    pub reopen_count: u32,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Alert content emitted by the screener, before it is stored. Stored alerts
/// always start `open`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AlertDraft {
    pub decision_id: String,
    pub decision_type: DecisionType,
    pub alert_type: AlertType,
    pub protected_attribute: Option<String>,
    pub metric_name: String,
    pub metric_value: f64,
    pub threshold: f64,
    pub severity: Severity,
    pub description: String,
}
