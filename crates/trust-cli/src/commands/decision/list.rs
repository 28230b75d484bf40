use trust_core::errors::GovernanceError;
use trust_db::repos::decision::DecisionFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::access::listing_scope;
use crate::commands::shared::parse::{parse_decision_type, parse_since};
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    user: Option<&str>,
    decision_type: Option<&str>,
    outcome: Option<&str>,
    since: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = DecisionFilter {
        user_id: listing_scope(&ctx.caller, user)?,
        decision_type: decision_type.map(parse_decision_type).transpose()?,
        outcome: outcome.map(str::to_string),
        since: since.map(parse_since).transpose()?,
        limit: flags.limit,
    };
    let decisions = ctx
        .service
        .list_decisions(&filter)
        .await
        .map_err(GovernanceError::from)?;
    output(&decisions, flags.format)
}
