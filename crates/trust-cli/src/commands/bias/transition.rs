use trust_core::enums::InvestigationStatus;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    id: &str,
    to: &str,
    notes: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let to: InvestigationStatus = parse_enum(to, "status")?;
    let alert = ctx
        .service
        .transition_bias_alert(&ctx.caller, id, to, notes.map(str::to_string))
        .await?;
    output(&alert, flags.format)
}
