mod list;
mod update;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ConsentCommands;
use crate::context::AppContext;

/// Handle `trustai consent`.
pub async fn handle(action: &ConsentCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ConsentCommands::List { user } => list::run(user.as_deref(), ctx, flags).await,
        ConsentCommands::Update {
            consent_id,
            user,
            grant,
            revoke: _,
        } => update::run(consent_id, user.as_deref(), *grant, ctx, flags).await,
    }
}
