use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AuditAction, AuditStatus, ResourceType, RiskLevel};

/// An append-only audit trail entry for a governed action.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditLog {
    pub id: String,
    pub actor_id: Option<String>,
    pub action_type: AuditAction,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<String>,
    pub status: AuditStatus,
    pub risk_level: RiskLevel,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
