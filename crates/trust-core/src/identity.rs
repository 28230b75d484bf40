//! Caller identity passed from the request boundary into the core.
//!
//! The boundary authenticates and authorizes (see [`authorize`]); core
//! operations receive an already-verified [`Caller`] and never check roles
//! themselves.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::GovernanceError;

/// Role carried by an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    CustomerService,
    ComplianceOfficer,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::CustomerService => "customer_service",
            Self::ComplianceOfficer => "compliance_officer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "customer" => Ok(Self::Customer),
            "customer_service" => Ok(Self::CustomerService),
            "compliance_officer" => Ok(Self::ComplianceOfficer),
            "admin" => Ok(Self::Admin),
            other => Err(GovernanceError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Roles that may read other users' decisions and preferences.
pub const REVIEW_ROLES: &[Role] = &[Role::CustomerService, Role::ComplianceOfficer, Role::Admin];

/// Roles that may override decisions, work bias alerts, read the audit trail,
/// and export data.
pub const COMPLIANCE_ROLES: &[Role] = &[Role::ComplianceOfficer, Role::Admin];

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// Where a request came from. Recorded on audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Verified caller context handed to every governed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Caller {
    /// `None` for anonymous or system-initiated calls.
    pub actor: Option<Actor>,
    pub origin: RequestOrigin,
}

impl Caller {
    #[must_use]
    pub const fn new(actor: Option<Actor>, origin: RequestOrigin) -> Self {
        Self { actor, origin }
    }

    #[must_use]
    pub fn system() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn actor_id(&self) -> Option<&str> {
        self.actor.as_ref().map(|a| a.user_id.as_str())
    }

    /// The actor, or a `Validation` error naming the operation that needs one.
    ///
    /// # Errors
    ///
    /// Returns `GovernanceError::Validation` when the caller is anonymous.
    pub fn require_actor(&self, operation: &str) -> Result<&Actor, GovernanceError> {
        self.actor
            .as_ref()
            .ok_or_else(|| GovernanceError::Validation(format!("{operation} requires an actor")))
    }
}

/// Boundary role check.
///
/// # Errors
///
/// Returns `GovernanceError::Permission` when there is no actor or the actor's
/// role is not in `allowed`.
pub fn authorize<'a>(
    actor: Option<&'a Actor>,
    allowed: &[Role],
) -> Result<&'a Actor, GovernanceError> {
    let actor =
        actor.ok_or_else(|| GovernanceError::Permission("authentication required".into()))?;
    if allowed.contains(&actor.role) {
        Ok(actor)
    } else {
        Err(GovernanceError::Permission(format!(
            "role '{}' may not perform this action",
            actor.role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn authorize_checks_role() {
        let officer = Actor::new("usr-1", Role::ComplianceOfficer);
        assert!(authorize(Some(&officer), COMPLIANCE_ROLES).is_ok());

        let customer = Actor::new("usr-2", Role::Customer);
        let err = authorize(Some(&customer), REVIEW_ROLES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);

        let agent = Actor::new("usr-3", Role::CustomerService);
        assert!(authorize(Some(&agent), REVIEW_ROLES).is_ok());
        assert!(authorize(Some(&agent), COMPLIANCE_ROLES).is_err());

        let err = authorize(None, COMPLIANCE_ROLES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
    }

    #[test]
    fn require_actor_on_anonymous_caller() {
        let err = Caller::system().require_actor("override").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
