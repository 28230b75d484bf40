use clap::Subcommand;

/// Notification preference commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PrefsCommands {
    /// Show preferences (created with defaults on first access).
    Get {
        #[arg(long)]
        user: Option<String>,
    },
    /// Update preferences from typed flags or a JSON payload.
    Update {
        #[arg(long)]
        user: Option<String>,
        /// camelCase JSON payload, e.g. '{"smsEnabled": true}'.
        #[arg(
            long,
            conflicts_with_all = ["email", "sms", "push", "weekly_summary", "critical_only", "quiet_hours", "channels"]
        )]
        payload: Option<String>,
        #[arg(long)]
        email: Option<bool>,
        #[arg(long)]
        sms: Option<bool>,
        #[arg(long)]
        push: Option<bool>,
        #[arg(long)]
        weekly_summary: Option<bool>,
        #[arg(long)]
        critical_only: Option<bool>,
        /// HH:MM-HH:MM, or "none" to clear.
        #[arg(long)]
        quiet_hours: Option<String>,
        /// Comma-separated: email,sms,push
        #[arg(long)]
        channels: Option<String>,
    },
}
