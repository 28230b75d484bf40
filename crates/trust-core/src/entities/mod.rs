//! Entity structs for all TrustAI domain objects.
//!
//! Each entity maps to a table in the libSQL store. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON output and schema
//! validation.

mod audit;
mod bias_alert;
mod consent;
mod decision;
mod decision_override;
mod explanation;
pub mod notification;

pub use audit::AuditLog;
pub use bias_alert::{AlertDraft, BiasAlert};
pub use consent::Consent;
pub use decision::Decision;
pub use decision_override::DecisionOverride;
pub use explanation::{Explanation, ExplanationData, FeatureContribution};
pub use notification::NotificationPreference;
