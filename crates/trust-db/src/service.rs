//! Service layer orchestrating governed operations.
//!
//! `TrustService` wraps `TrustDb` (raw database access), the loaded
//! `TrustConfig`, and the engine components. Boundary repositories live in
//! [`crate::repos`] and the governed operations in [`crate::governance`], all
//! as `impl TrustService` blocks.

use trust_config::TrustConfig;
use trust_engine::{BiasScreener, DecisionEngine, Explainer};

use crate::TrustDb;
use crate::error::DatabaseError;

/// Orchestrates decisions, explanations, screening, overrides, and audit.
///
/// Mutating operations follow this protocol:
/// 1. Begin transaction (takes the write gate)
/// 2. Execute SQL, with savepoints around degradable steps
/// 3. Commit, or roll back on a non-degradable failure
/// 4. Append the audit entry in its own short transaction
pub struct TrustService {
    db: TrustDb,
    config: TrustConfig,
    engine: DecisionEngine,
    explainer: Explainer,
    screener: BiasScreener,
}

impl TrustService {
    /// Build a service over an open store.
    #[must_use]
    pub fn new(db: TrustDb, config: TrustConfig) -> Self {
        let engine = DecisionEngine::from_config(&config.engine);
        let explainer = Explainer::new(
            engine.registry().clone(),
            config.bias.protected_attributes.clone(),
        );
        Self::from_parts(db, config, engine, explainer)
    }

    /// Build a service around an explicit engine and explainer. The screener
    /// still comes from `config.bias`.
    #[must_use]
    pub fn from_parts(
        db: TrustDb,
        config: TrustConfig,
        engine: DecisionEngine,
        explainer: Explainer,
    ) -> Self {
        let screener = BiasScreener::new(config.bias.clone());
        Self {
            db,
            config,
            engine,
            explainer,
            screener,
        }
    }

    /// Open the store at `config.database.path` and build the service.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn open(config: TrustConfig) -> Result<Self, DatabaseError> {
        let db = TrustDb::open_local(&config.database.path).await?;
        Ok(Self::new(db, config))
    }

    /// In-memory store, ignoring `config.database.path`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if migrations fail.
    pub async fn open_in_memory(config: TrustConfig) -> Result<Self, DatabaseError> {
        let db = TrustDb::open_local(trust_config::IN_MEMORY).await?;
        Ok(Self::new(db, config))
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &TrustDb {
        &self.db
    }

    #[must_use]
    pub const fn config(&self) -> &TrustConfig {
        &self.config
    }

    #[must_use]
    pub const fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    #[must_use]
    pub const fn explainer(&self) -> &Explainer {
        &self.explainer
    }

    #[must_use]
    pub const fn screener(&self) -> &BiasScreener {
        &self.screener
    }
}
