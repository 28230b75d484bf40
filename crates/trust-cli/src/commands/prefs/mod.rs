mod get;
mod update;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PrefsCommands;
use crate::context::AppContext;

/// Handle `trustai prefs`.
pub async fn handle(action: &PrefsCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        PrefsCommands::Get { user } => get::run(user.as_deref(), ctx, flags).await,
        PrefsCommands::Update {
            user,
            payload,
            email,
            sms,
            push,
            weekly_summary,
            critical_only,
            quiet_hours,
            channels,
        } => {
            let payload = match payload {
                Some(raw) => update::Payload::Json(raw),
                None => update::Payload::Flags(update::PreferenceFlags {
                    email: *email,
                    sms: *sms,
                    push: *push,
                    weekly_summary: *weekly_summary,
                    critical_only: *critical_only,
                    quiet_hours: quiet_hours.as_deref(),
                    channels: channels.as_deref(),
                }),
            };
            update::run(user.as_deref(), &payload, ctx, flags).await
        }
    }
}
