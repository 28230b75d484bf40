use trust_config::TrustConfig;
use trust_core::errors::GovernanceError;
use trust_core::identity::{Actor, Caller, RequestOrigin, Role};
use trust_db::TrustService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: TrustService,
    /// Identity from `--actor`/`--role`, standing in for an authenticated
    /// request.
    pub caller: Caller,
}

impl AppContext {
    /// Resolve the caller and open the store (running migrations).
    pub async fn init(config: TrustConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let caller = caller_from_flags(flags)?;
        let service = TrustService::open(config)
            .await
            .map_err(GovernanceError::from)?;
        tracing::debug!(actor = ?caller.actor_id(), "context: initialized");
        Ok(Self { service, caller })
    }
}

/// Build the caller from global flags. `--role` defaults to `customer` and
/// is meaningless without `--actor`.
///
/// # Errors
///
/// Returns `Validation` for a blank actor, an unknown role, or a role
/// without an actor.
pub fn caller_from_flags(flags: &GlobalFlags) -> Result<Caller, GovernanceError> {
    let role = flags.role.as_deref().map(str::parse::<Role>).transpose()?;
    let actor = match flags.actor.as_deref().map(str::trim) {
        Some("") => {
            return Err(GovernanceError::Validation("--actor must not be blank".into()));
        }
        Some(user_id) => Some(Actor::new(user_id, role.unwrap_or(Role::Customer))),
        None if role.is_some() => {
            return Err(GovernanceError::Validation("--role requires --actor".into()));
        }
        None => None,
    };

    let origin = RequestOrigin {
        ip_address: flags.ip.clone(),
        user_agent: Some(
            flags
                .user_agent
                .clone()
                .unwrap_or_else(|| format!("trustai/{}", env!("CARGO_PKG_VERSION"))),
        ),
    };
    Ok(Caller::new(actor, origin))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trust_core::errors::ErrorKind;
    use trust_core::identity::{Actor, Role};

    use super::caller_from_flags;
    use crate::cli::{GlobalFlags, OutputFormat};

    fn flags(actor: Option<&str>, role: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            db: None,
            actor: actor.map(str::to_string),
            role: role.map(str::to_string),
            ip: Some("10.0.0.1".into()),
            user_agent: None,
        }
    }

    #[test]
    fn actor_defaults_to_customer_role() {
        let caller = caller_from_flags(&flags(Some("usr-alice"), None)).unwrap();
        assert_eq!(caller.actor, Some(Actor::new("usr-alice", Role::Customer)));
        assert_eq!(caller.origin.ip_address.as_deref(), Some("10.0.0.1"));
        assert!(
            caller
                .origin
                .user_agent
                .as_deref()
                .is_some_and(|ua| ua.starts_with("trustai/"))
        );
    }

    #[test]
    fn explicit_role_is_parsed() {
        let caller =
            caller_from_flags(&flags(Some("usr-olga"), Some("compliance_officer"))).unwrap();
        assert_eq!(caller.actor.map(|a| a.role), Some(Role::ComplianceOfficer));
    }

    #[test]
    fn anonymous_caller_has_no_actor() {
        let caller = caller_from_flags(&flags(None, None)).unwrap();
        assert!(caller.actor.is_none());
    }

    #[test]
    fn invalid_identity_flags_are_validation_errors() {
        for (actor, role) in [
            (Some("usr-1"), Some("superuser")),
            (None, Some("admin")),
            (Some("  "), None),
        ] {
            let err = caller_from_flags(&flags(actor, role)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{actor:?} {role:?}");
        }
    }
}
