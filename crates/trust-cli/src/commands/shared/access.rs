//! Boundary authorization. The core trusts the `Caller` it is handed; these
//! checks decide whether a command may run for that caller at all.

use trust_core::errors::GovernanceError;
use trust_core::identity::{Actor, Caller, REVIEW_ROLES, Role, authorize};

const ANY_ROLE: &[Role] = &[
    Role::Customer,
    Role::CustomerService,
    Role::ComplianceOfficer,
    Role::Admin,
];

/// The caller's actor if their role is in `roles`.
pub fn require_roles<'a>(caller: &'a Caller, roles: &[Role]) -> Result<&'a Actor, GovernanceError> {
    authorize(caller.actor.as_ref(), roles)
}

/// Whose data a command works on: the requested user, or the caller when
/// none is given. Another user's data needs a review role.
pub fn resolve_subject(caller: &Caller, requested: Option<&str>) -> Result<String, GovernanceError> {
    let actor = require_roles(caller, ANY_ROLE)?;
    match requested.map(str::trim).filter(|user| !user.is_empty()) {
        None => Ok(actor.user_id.clone()),
        Some(user) => {
            if user != actor.user_id {
                authorize(Some(actor), REVIEW_ROLES)?;
            }
            Ok(user.to_string())
        }
    }
}

/// Permit reading a record that belongs to `owner`.
pub fn check_owner(caller: &Caller, owner: &str) -> Result<(), GovernanceError> {
    resolve_subject(caller, Some(owner)).map(|_| ())
}

/// User filter for listings: reviewers see everyone unless they ask for one
/// user; everybody else sees only their own records.
pub fn listing_scope(caller: &Caller, requested: Option<&str>) -> Result<Option<String>, GovernanceError> {
    if requested.is_some() {
        return resolve_subject(caller, requested).map(Some);
    }
    let actor = require_roles(caller, ANY_ROLE)?;
    if REVIEW_ROLES.contains(&actor.role) {
        Ok(None)
    } else {
        Ok(Some(actor.user_id.clone()))
    }
}
