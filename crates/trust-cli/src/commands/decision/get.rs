use serde::Serialize;
use trust_core::entities::{Decision, Explanation};
use trust_core::errors::GovernanceError;

use super::visible_decision;
use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct DecisionDetailResponse {
    decision: Decision,
    explanation: Option<Explanation>,
}

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let decision = visible_decision(id, ctx).await?;
    let explanation = ctx
        .service
        .get_explanation(&decision.id)
        .await
        .map_err(GovernanceError::from)?;
    output(&DecisionDetailResponse { decision, explanation }, flags.format)
}
