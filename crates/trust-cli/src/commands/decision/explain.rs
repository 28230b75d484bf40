use super::visible_decision;
use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let decision = visible_decision(id, ctx).await?;
    let explanation = ctx.service.explain_decision(&ctx.caller, &decision.id).await?;
    output(&explanation, flags.format)
}
