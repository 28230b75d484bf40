use trust_core::identity::COMPLIANCE_ROLES;

use crate::cli::GlobalFlags;
use crate::commands::shared::access::require_roles;
use crate::context::AppContext;
use crate::output::output;

/// Handle `trustai models`. Compliance-only.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    require_roles(&ctx.caller, COMPLIANCE_ROLES)?;
    let report = ctx.service.model_performance().await?;
    output(&report, flags.format)
}
