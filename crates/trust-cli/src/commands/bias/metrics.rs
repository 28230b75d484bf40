use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let metrics = ctx.service.current_bias_metrics().await?;
    output(&metrics, flags.format)
}
