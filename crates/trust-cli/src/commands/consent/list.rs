use crate::cli::GlobalFlags;
use crate::commands::shared::access::resolve_subject;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(user: Option<&str>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let user_id = resolve_subject(&ctx.caller, user)?;
    let consents = ctx.service.list_consents(&user_id).await?;
    output(&consents, flags.format)
}
