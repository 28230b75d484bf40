use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(id: &str, reason: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let alert = ctx.service.reopen_bias_alert(&ctx.caller, id, reason).await?;
    output(&alert, flags.format)
}
