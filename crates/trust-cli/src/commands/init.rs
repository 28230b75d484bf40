use serde::Serialize;
use trust_config::{PROJECT_CONFIG_PATH, TrustConfig};
use trust_core::errors::GovernanceError;
use trust_db::TrustService;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Debug, Serialize)]
struct InitResponse {
    database: String,
    in_memory: bool,
    project_config: Option<&'static str>,
}

impl InitResponse {
    fn for_config(config: &TrustConfig) -> Self {
        Self {
            database: config.database.path.clone(),
            in_memory: config.database.is_in_memory(),
            project_config: std::path::Path::new(PROJECT_CONFIG_PATH)
                .exists()
                .then_some(PROJECT_CONFIG_PATH),
        }
    }
}

/// Handle `trustai init`: open the store, which creates it and applies the
/// migrations.
pub async fn handle(config: TrustConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let service = TrustService::open(config)
        .await
        .map_err(GovernanceError::from)?;
    tracing::info!(path = %service.config().database.path, "init: store ready");
    output(&InitResponse::for_config(service.config()), flags.format)
}

