use clap::Subcommand;

/// Decision commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DecisionCommands {
    /// Run an automated decision.
    Simulate {
        /// loan_approval, fraud_detection, personalized_offer, risk_profiling
        #[arg(long = "type")]
        decision_type: String,
        /// Input payload as a JSON object.
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,
        /// Path to a JSON file holding the input payload.
        #[arg(long)]
        input_file: Option<String>,
        /// Whom the decision is about (defaults to the caller).
        #[arg(long)]
        subject: Option<String>,
    },
    /// Get a decision with its explanation.
    Get { id: String },
    /// List decisions, newest first.
    List {
        #[arg(long)]
        user: Option<String>,
        #[arg(long = "type")]
        decision_type: Option<String>,
        #[arg(long)]
        outcome: Option<String>,
        /// RFC 3339 timestamp; only decisions at or after it.
        #[arg(long)]
        since: Option<String>,
    },
    /// Explain a decision, generating the explanation if needed.
    Explain { id: String },
    /// Override a decision's outcome.
    Override {
        id: String,
        #[arg(long)]
        outcome: String,
        #[arg(long)]
        reason: String,
        /// low, medium, high, critical
        #[arg(long, default_value = "medium")]
        risk: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Override chain of a decision, oldest first.
    Overrides { id: String },
}
