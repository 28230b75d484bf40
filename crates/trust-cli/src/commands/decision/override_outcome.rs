use trust_core::enums::RiskLevel;
use trust_core::identity::COMPLIANCE_ROLES;
use trust_db::governance::OverrideRequest;

use crate::cli::GlobalFlags;
use crate::commands::shared::access::require_roles;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    id: &str,
    outcome: &str,
    reason: &str,
    risk: &str,
    notes: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    require_roles(&ctx.caller, COMPLIANCE_ROLES)?;
    let risk_level: RiskLevel = parse_enum(risk, "risk")?;

    let result = ctx
        .service
        .override_decision(
            &ctx.caller,
            OverrideRequest {
                decision_id: id.to_string(),
                new_outcome: outcome.to_string(),
                reason: reason.to_string(),
                risk_level,
                reviewer_notes: notes.map(str::to_string),
            },
        )
        .await?;
    output(&result, flags.format)
}
