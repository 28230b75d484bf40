//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `details` JSON blob. These types
//! give the common shapes a schema; the recorder serializes them with
//! `serde_json::to_value`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ConsentType, DecisionType, RiskLevel};
use crate::errors::ErrorKind;

/// Detail for `AuditAction::AiDecision`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DecisionMadeDetail {
    pub decision_type: DecisionType,
    pub outcome: String,
    pub confidence: f64,
    pub model_name: String,
    pub model_version: String,
    pub alerts_raised: u32,
    /// Degraded steps (explanation or screening) that did not complete.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Detail for `AuditAction::DecisionOverride`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OverrideDetail {
    pub old_outcome: String,
    pub new_outcome: String,
    pub reason: String,
    pub requested_risk_level: RiskLevel,
}

/// Detail for any audited failure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FailureDetail {
    pub error_kind: ErrorKind,
    pub message: String,
}

/// Detail for `AuditAction::BiasAlertUpdate`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
}

/// Detail for `AuditAction::ConsentUpdate`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConsentChangedDetail {
    pub consent_type: ConsentType,
    pub granted: bool,
}

/// Detail for `AuditAction::NotificationPreferencesUpdate`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PreferencesUpdatedDetail {
    pub updated_fields: Vec<String>,
}

/// Detail for `AuditAction::ExplanationGenerated`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExplanationGeneratedDetail {
    pub method: String,
    pub lazy: bool,
}

/// Detail for `AuditAction::DataExport`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExportDetail {
    pub decisions: u32,
    pub consents: u32,
    pub overrides: u32,
    pub bias_alerts: u32,
    pub audit_logs: u32,
}
