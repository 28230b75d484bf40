//! Governed operations.
//!
//! Each operation validates its request, runs its writes in one
//! [`Transaction`](crate::Transaction), and appends the audit entry after the
//! transaction has closed. Role checks are the caller's job; these functions
//! take an already-authorized [`Caller`](trust_core::identity::Caller).

pub mod alerts;
pub mod consent;
pub mod explain;
pub mod export;
pub mod models;
pub mod overrides;
pub mod pipeline;
pub mod preferences;
pub mod stats;

pub use overrides::OverrideRequest;
pub use pipeline::SimulateRequest;
pub use stats::StatsScope;

use trust_core::errors::{ErrorKind, GovernanceError};

/// Slack for float noise in `AVG` before truncating to a whole percent.
const PERCENT_EPSILON: f64 = 1e-9;

/// Average explanation accuracy truncated to a whole percent, 0 when unknown.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn fairness_score(average_accuracy: Option<f64>) -> u32 {
    average_accuracy.map_or(0, |a| {
        (a.clamp(0.0, 1.0) * 100.0 + PERCENT_EPSILON).floor() as u32
    })
}

/// Request-shape errors are returned to the caller without an audit entry;
/// every other failure of a governed action is recorded.
pub(crate) fn audits_failure(err: &GovernanceError) -> bool {
    err.kind() != ErrorKind::Validation
}
