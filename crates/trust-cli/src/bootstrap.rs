use anyhow::Context;
use trust_config::TrustConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration (with `.env` support) and apply the `--db`
/// override.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<TrustConfig> {
    let mut config = TrustConfig::load_with_dotenv().context("failed to load trustai configuration")?;
    apply_overrides(&mut config, flags);
    Ok(config)
}

fn apply_overrides(config: &mut TrustConfig, flags: &GlobalFlags) {
    if let Some(path) = flags.db.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        tracing::debug!(path, "bootstrap: database path overridden");
        config.database.path = path.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::apply_overrides;
    use crate::cli::{GlobalFlags, OutputFormat};
    use trust_config::TrustConfig;

    fn flags(db: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            db: db.map(str::to_string),
            actor: None,
            role: None,
            ip: None,
            user_agent: None,
        }
    }

    #[test]
    fn db_flag_replaces_configured_path() {
        let mut config = TrustConfig::default();
        apply_overrides(&mut config, &flags(Some(":memory:")));
        assert!(config.database.is_in_memory());
    }

    #[test]
    fn blank_db_flag_is_ignored() {
        let mut config = TrustConfig::default();
        apply_overrides(&mut config, &flags(Some("  ")));
        assert_eq!(config.database.path, ".trustai/trustai.db");
    }
}
