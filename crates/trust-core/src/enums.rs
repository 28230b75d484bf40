//! Status enums, decision types, audit actions, and channels for TrustAI.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::GovernanceError;

// ---------------------------------------------------------------------------
// DecisionType
// ---------------------------------------------------------------------------

/// Kind of automated decision. Each type is served by exactly one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    LoanApproval,
    #[serde(alias = "fraud_check")]
    FraudDetection,
    PersonalizedOffer,
    #[serde(alias = "risk_profile")]
    RiskProfiling,
}

impl DecisionType {
    pub const ALL: [Self; 4] = [
        Self::LoanApproval,
        Self::FraudDetection,
        Self::PersonalizedOffer,
        Self::RiskProfiling,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoanApproval => "loan_approval",
            Self::FraudDetection => "fraud_detection",
            Self::PersonalizedOffer => "personalized_offer",
            Self::RiskProfiling => "risk_profiling",
        }
    }

    /// Outcomes counted as favorable to the subject when measuring disparate impact.
    #[must_use]
    pub const fn favorable_outcomes(self) -> &'static [&'static str] {
        match self {
            Self::LoanApproval => &["approved"],
            Self::FraudDetection => &["cleared"],
            Self::PersonalizedOffer => &["premium_offer", "standard_offer"],
            Self::RiskProfiling => &["aggressive", "moderate"],
        }
    }

    #[must_use]
    pub fn is_favorable(self, outcome: &str) -> bool {
        self.favorable_outcomes().contains(&outcome)
    }

    /// The consent a subject must have granted before this type may run
    /// (when consent enforcement is on).
    #[must_use]
    pub const fn required_consent(self) -> ConsentType {
        match self {
            Self::LoanApproval => ConsentType::CreditScoring,
            Self::FraudDetection => ConsentType::FraudDetection,
            Self::PersonalizedOffer => ConsentType::PersonalizedOffers,
            Self::RiskProfiling => ConsentType::RiskProfiling,
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionType {
    type Err = GovernanceError;

    /// Accepts canonical names plus the `fraud_check` and `risk_profile` aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "loan_approval" => Ok(Self::LoanApproval),
            "fraud_detection" | "fraud_check" => Ok(Self::FraudDetection),
            "personalized_offer" => Ok(Self::PersonalizedOffer),
            "risk_profiling" | "risk_profile" => Ok(Self::RiskProfiling),
            other => Err(GovernanceError::UnsupportedDecisionType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Bias alert severity. Ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InvestigationStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a bias alert.
///
/// ```text
/// open → investigating → resolved
///                      → dismissed
/// ```
///
/// Moving a closed alert back to `investigating` is not a transition; it is the
/// separate reopen action (see [`InvestigationStatus::can_reopen`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationStatus {
    Open,
    Investigating,
    Resolved,
    Dismissed,
}

impl InvestigationStatus {
    pub const ALL: [Self; 4] = [
        Self::Open,
        Self::Investigating,
        Self::Resolved,
        Self::Dismissed,
    ];

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::Investigating],
            Self::Investigating => &[Self::Resolved, Self::Dismissed],
            Self::Resolved | Self::Dismissed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Resolved | Self::Dismissed)
    }

    /// Only closed alerts may be reopened.
    #[must_use]
    pub const fn can_reopen(self) -> bool {
        self.is_closed()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for InvestigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Risk attached to an audited action or requested override.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditStatus
// ---------------------------------------------------------------------------

/// Outcome status recorded on an audit entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[default]
    Success,
    Failure,
}

impl AuditStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Governed action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Register,
    Logout,
    ConsentUpdate,
    AiDecision,
    DecisionOverride,
    NotificationPreferencesUpdate,
    DataExport,
    ExplanationGenerated,
    BiasAlertUpdate,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Logout => "logout",
            Self::ConsentUpdate => "consent_update",
            Self::AiDecision => "ai_decision",
            Self::DecisionOverride => "decision_override",
            Self::NotificationPreferencesUpdate => "notification_preferences_update",
            Self::DataExport => "data_export",
            Self::ExplanationGenerated => "explanation_generated",
            Self::BiasAlertUpdate => "bias_alert_update",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResourceType
// ---------------------------------------------------------------------------

/// Kind of resource an audit entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Decision,
    Explanation,
    BiasAlert,
    DecisionOverride,
    Consent,
    NotificationPreference,
    User,
    Export,
}

impl ResourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Explanation => "explanation",
            Self::BiasAlert => "bias_alert",
            Self::DecisionOverride => "decision_override",
            Self::Consent => "consent",
            Self::NotificationPreference => "notification_preference",
            Self::User => "user",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OverrideStatus
// ---------------------------------------------------------------------------

/// Status of a decision override. Overrides are applied on creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverrideStatus {
    #[default]
    Applied,
}

impl OverrideStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
        }
    }
}

impl fmt::Display for OverrideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConsentType
// ---------------------------------------------------------------------------

/// Data-processing purpose a user can grant or revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConsentType {
    CreditScoring,
    FraudDetection,
    PersonalizedOffers,
    RiskProfiling,
}

impl ConsentType {
    pub const ALL: [Self; 4] = [
        Self::CreditScoring,
        Self::FraudDetection,
        Self::PersonalizedOffers,
        Self::RiskProfiling,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditScoring => "credit_scoring",
            Self::FraudDetection => "fraud_detection",
            Self::PersonalizedOffers => "personalized_offers",
            Self::RiskProfiling => "risk_profiling",
        }
    }

    /// Purpose text shown to the user for the default consent record.
    #[must_use]
    pub const fn purpose_description(self) -> &'static str {
        match self {
            Self::CreditScoring => {
                "Use of financial history and credit data to assess loan applications"
            }
            Self::FraudDetection => {
                "Monitoring of transaction patterns to detect and prevent fraud"
            }
            Self::PersonalizedOffers => {
                "Analysis of account activity to tailor product offers"
            }
            Self::RiskProfiling => {
                "Assessment of investment preferences to determine a risk profile"
            }
        }
    }
}

impl fmt::Display for ConsentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Notification delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Push,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Email, Self::Sms, Self::Push];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "push" => Ok(Self::Push),
            other => Err(GovernanceError::Validation(format!(
                "unknown notification channel '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// AlertType
// ---------------------------------------------------------------------------

/// Which fairness check raised a bias alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    DisparateImpact,
    ProtectedFeatureInfluence,
    AccuracyDegradation,
}

impl AlertType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DisparateImpact => "disparate_impact",
            Self::ProtectedFeatureInfluence => "protected_feature_influence",
            Self::AccuracyDegradation => "accuracy_degradation",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
