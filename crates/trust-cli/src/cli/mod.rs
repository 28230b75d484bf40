use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `trustai` binary.
#[derive(Debug, Parser)]
#[command(name = "trustai", version, about = "TrustAI - governed automated decisions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path (overrides database.path)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Authenticated user ID of the caller
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Caller role: customer, customer_service, compliance_officer, admin
    #[arg(long, global = true)]
    pub role: Option<String>,

    /// Client IP address recorded on audit entries
    #[arg(long, global = true)]
    pub ip: Option<String>,

    /// Client user agent recorded on audit entries
    #[arg(long, global = true)]
    pub user_agent: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
            actor: self.actor.clone(),
            role: self.role.clone(),
            ip: self.ip.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}
