use trust_core::errors::GovernanceError;
use trust_db::repos::bias_alert::AlertFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_decision_type, parse_enum};
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    status: Option<&str>,
    severity: Option<&str>,
    decision_type: Option<&str>,
    decision: Option<&str>,
    open: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = AlertFilter {
        status: status.map(|s| parse_enum(s, "status")).transpose()?,
        severity: severity.map(|s| parse_enum(s, "severity")).transpose()?,
        decision_id: decision.map(str::to_string),
        decision_type: decision_type.map(parse_decision_type).transpose()?,
        limit: flags.limit,
    };
    let alerts = if open {
        ctx.service.list_open_alerts(&filter).await
    } else {
        ctx.service.list_bias_alerts(&filter).await
    }
    .map_err(GovernanceError::from)?;
    output(&alerts, flags.format)
}
