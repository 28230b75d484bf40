use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::DecisionType;

/// An automated decision made on behalf of a user.
///
/// `outcome` is the single authoritative outcome; it only changes through an
/// override. `confidence_score` always comes from the engine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Decision {
    pub id: String,
    pub user_id: String,
    pub decision_type: DecisionType,
    pub model_name: String,
    pub model_version: String,
    pub outcome: String,
    pub confidence_score: f64,
    pub processing_time_ms: u64,
    pub input_data: serde_json::Value,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Decision {
    #[must_use]
    pub fn is_favorable(&self) -> bool {
        self.decision_type.is_favorable(&self.outcome)
    }
}
