use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{OverrideStatus, RiskLevel};

/// A human replacement of a decision's outcome.
///
/// `old_outcome` is the outcome observed in the same transaction that applied
/// the change, so consecutive overrides of one decision form a chain.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionOverride {
    pub id: String,
    pub decision_id: String,
    pub requested_by: String,
    pub approved_by: String,
    pub target_user_id: String,
    pub old_outcome: String,
    pub new_outcome: String,
    pub reason: String,
    pub reviewer_notes: Option<String>,
    pub status: OverrideStatus,
    pub risk_level: RiskLevel,
    pub created_at: DateTime<Utc>,
}
