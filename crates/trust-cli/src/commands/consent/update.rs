use crate::cli::GlobalFlags;
use crate::commands::shared::access::resolve_subject;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    consent_id: &str,
    user: Option<&str>,
    granted: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let user_id = resolve_subject(&ctx.caller, user)?;
    let consent = ctx
        .service
        .update_consent(&ctx.caller, &user_id, consent_id, granted)
        .await?;
    output(&consent, flags.format)
}
