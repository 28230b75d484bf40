use trust_core::identity::COMPLIANCE_ROLES;
use trust_db::governance::StatsScope;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StatsArgs;
use crate::commands::shared::access::{require_roles, resolve_subject};
use crate::context::AppContext;
use crate::output::output;

/// Handle `trustai stats`. System-wide statistics are compliance-only; a
/// user's own statistics are open to that user.
pub async fn handle(args: &StatsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let scope = match args.user.as_deref() {
        Some(user) => StatsScope::User(resolve_subject(&ctx.caller, Some(user))?),
        None => {
            require_roles(&ctx.caller, COMPLIANCE_ROLES)?;
            StatsScope::System
        }
    };
    let stats = ctx.service.dashboard_stats(&scope).await?;
    output(&stats, flags.format)
}
