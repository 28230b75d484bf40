use super::visible_decision;
use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let decision = visible_decision(id, ctx).await?;
    let chain = ctx.service.override_chain(&decision.id).await?;
    output(&chain, flags.format)
}
