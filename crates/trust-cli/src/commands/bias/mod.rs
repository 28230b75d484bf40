mod alerts;
mod metrics;
mod reopen;
mod transition;

use trust_core::identity::COMPLIANCE_ROLES;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::BiasCommands;
use crate::commands::shared::access::require_roles;
use crate::context::AppContext;

/// Handle `trustai bias`. Every bias command is compliance-only.
pub async fn handle(action: &BiasCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    require_roles(&ctx.caller, COMPLIANCE_ROLES)?;
    match action {
        BiasCommands::Alerts {
            status,
            severity,
            decision_type,
            decision,
            open,
        } => {
            alerts::run(
                status.as_deref(),
                severity.as_deref(),
                decision_type.as_deref(),
                decision.as_deref(),
                *open,
                ctx,
                flags,
            )
            .await
        }
        BiasCommands::Metrics => metrics::run(ctx, flags).await,
        BiasCommands::Transition { id, to, notes } => {
            transition::run(id, to, notes.as_deref(), ctx, flags).await
        }
        BiasCommands::Reopen { id, reason } => reopen::run(id, reason, ctx, flags).await,
    }
}
