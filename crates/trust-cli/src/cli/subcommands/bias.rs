use clap::Subcommand;

/// Bias alert commands.
#[derive(Clone, Debug, Subcommand)]
pub enum BiasCommands {
    /// List bias alerts.
    Alerts {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        severity: Option<String>,
        #[arg(long = "type")]
        decision_type: Option<String>,
        #[arg(long)]
        decision: Option<String>,
        /// Only alerts still awaiting a finding (open or investigating).
        #[arg(long)]
        open: bool,
    },
    /// Aggregate fairness metrics.
    Metrics,
    /// Move an alert along its investigation lifecycle.
    Transition {
        id: String,
        /// investigating, resolved, dismissed
        #[arg(long)]
        to: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reopen a resolved or dismissed alert.
    Reopen {
        id: String,
        #[arg(long)]
        reason: String,
    },
}
