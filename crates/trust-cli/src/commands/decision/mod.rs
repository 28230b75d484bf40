mod explain;
mod get;
mod list;
mod override_outcome;
mod overrides;
mod simulate;

use trust_core::entities::Decision;
use trust_core::errors::GovernanceError;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DecisionCommands;
use crate::commands::shared::access::check_owner;
use crate::context::AppContext;

/// Handle `trustai decision`.
pub async fn handle(action: &DecisionCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        DecisionCommands::Simulate {
            decision_type,
            input,
            input_file,
            subject,
        } => {
            simulate::run(
                decision_type,
                input.as_deref(),
                input_file.as_deref(),
                subject.as_deref(),
                ctx,
                flags,
            )
            .await
        }
        DecisionCommands::Get { id } => get::run(id, ctx, flags).await,
        DecisionCommands::List {
            user,
            decision_type,
            outcome,
            since,
        } => {
            list::run(
                user.as_deref(),
                decision_type.as_deref(),
                outcome.as_deref(),
                since.as_deref(),
                ctx,
                flags,
            )
            .await
        }
        DecisionCommands::Explain { id } => explain::run(id, ctx, flags).await,
        DecisionCommands::Override {
            id,
            outcome,
            reason,
            risk,
            notes,
        } => override_outcome::run(id, outcome, reason, risk, notes.as_deref(), ctx, flags).await,
        DecisionCommands::Overrides { id } => overrides::run(id, ctx, flags).await,
    }
}

/// Load a decision the caller may see.
async fn visible_decision(id: &str, ctx: &AppContext) -> Result<Decision, GovernanceError> {
    let decision = ctx
        .service
        .get_decision(id)
        .await
        .map_err(GovernanceError::from)?
        .ok_or_else(|| GovernanceError::not_found("decision", id))?;
    check_owner(&ctx.caller, &decision.user_id)?;
    Ok(decision)
}
