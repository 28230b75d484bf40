//! # trust-engine
//!
//! Pure computation for the TrustAI governance pipeline:
//!
//! - [`DecisionEngine`]: one simulated [`DecisionModel`] per decision type
//! - [`Explainer`]: linear attribution and fairness metrics for a decision
//! - [`BiasScreener`]: disparate impact, protected-feature influence, and
//!   accuracy checks that produce alert drafts
//! - [`OutcomeHistory`]: favorable-outcome tallies by protected group
//!
//! Nothing here touches storage.

pub mod engine;
pub mod error;
pub mod explainer;
pub mod history;
pub mod models;
pub mod payload;
pub mod screener;

pub use engine::{DecisionEngine, DecisionResult};
pub use error::EngineError;
pub use explainer::Explainer;
pub use history::OutcomeHistory;
pub use models::{DecisionModel, ModelOutput, ModelRegistry};
pub use screener::BiasScreener;
