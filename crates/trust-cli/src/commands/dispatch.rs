use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Decision { action } => commands::decision::handle(&action, ctx, flags).await,
        Commands::Bias { action } => commands::bias::handle(&action, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Prefs { action } => commands::prefs::handle(&action, ctx, flags).await,
        Commands::Consent { action } => commands::consent::handle(&action, ctx, flags).await,
        Commands::Stats(args) => commands::stats::handle(&args, ctx, flags).await,
        Commands::Models => commands::models::handle(ctx, flags).await,
        Commands::Export(args) => commands::export::handle(&args, ctx, flags).await,
        Commands::Init => unreachable!("init is pre-dispatched in main"),
    }
}
