use clap::{Args, Subcommand};

use crate::cli::subcommands::{BiasCommands, ConsentCommands, DecisionCommands, PrefsCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the store and apply migrations.
    Init,
    /// Automated decisions.
    Decision {
        #[command(subcommand)]
        action: DecisionCommands,
    },
    /// Bias alerts and fairness metrics.
    Bias {
        #[command(subcommand)]
        action: BiasCommands,
    },
    /// Query the audit trail.
    Audit(AuditArgs),
    /// Notification preferences.
    Prefs {
        #[command(subcommand)]
        action: PrefsCommands,
    },
    /// Data-processing consents.
    Consent {
        #[command(subcommand)]
        action: ConsentCommands,
    },
    /// Dashboard statistics.
    Stats(StatsArgs),
    /// Usage report for every registered decision model.
    Models,
    /// Export governed data for offline review.
    Export(ExportArgs),
}

/// Arguments for `trustai audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Only entries recorded for this actor.
    #[arg(long)]
    pub by: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub resource_type: Option<String>,
    #[arg(long)]
    pub resource_id: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub risk: Option<String>,
    /// RFC 3339 timestamp; only entries at or after it.
    #[arg(long)]
    pub since: Option<String>,
}

/// Arguments for `trustai stats`.
#[derive(Clone, Debug, Args)]
pub struct StatsArgs {
    /// Statistics for one user instead of the whole system.
    #[arg(long)]
    pub user: Option<String>,
}

/// Arguments for `trustai export`.
#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// File to write; prints to stdout when omitted.
    #[arg(long, short)]
    pub output: Option<String>,
    /// Export file format: json or jsonl
    #[arg(long, default_value = "json")]
    pub file_format: String,
}
