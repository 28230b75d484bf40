use trust_core::errors::GovernanceError;
use trust_core::identity::COMPLIANCE_ROLES;
use trust_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::access::require_roles;
use crate::commands::shared::parse::{parse_enum, parse_since};
use crate::context::AppContext;
use crate::output::output;

/// Handle `trustai audit`: filtered audit entries, newest first.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    require_roles(&ctx.caller, COMPLIANCE_ROLES)?;
    let filter = audit_filter(args, flags.limit)?;
    let entries = ctx
        .service
        .query_audit_logs(&filter)
        .await
        .map_err(GovernanceError::from)?;
    output(&entries, flags.format)
}

fn audit_filter(args: &AuditArgs, limit: Option<u32>) -> Result<AuditFilter, GovernanceError> {
    Ok(AuditFilter {
        actor_id: args.by.clone(),
        action: args.action.as_deref().map(|a| parse_enum(a, "action")).transpose()?,
        resource_type: args
            .resource_type
            .as_deref()
            .map(|r| parse_enum(r, "resource type"))
            .transpose()?,
        resource_id: args.resource_id.clone(),
        status: args.status.as_deref().map(|s| parse_enum(s, "status")).transpose()?,
        risk_level: args.risk.as_deref().map(|r| parse_enum(r, "risk")).transpose()?,
        since: args.since.as_deref().map(parse_since).transpose()?,
        limit,
    })
}
