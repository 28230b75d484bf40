use clap::Subcommand;

/// Consent commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ConsentCommands {
    /// List consents (defaults are created on first access).
    List {
        #[arg(long)]
        user: Option<String>,
    },
    /// Grant or revoke a consent.
    Update {
        consent_id: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, conflicts_with = "revoke", required_unless_present = "revoke")]
        grant: bool,
        #[arg(long)]
        revoke: bool,
    },
}
