//! Boundary repositories for every TrustAI entity.
//!
//! Each module adds methods to `TrustService` via `impl TrustService` blocks.
//! Writes take a `&Transaction`; reads use the shared connection.

pub mod audit;
pub mod bias_alert;
pub mod consent;
pub mod decision;
pub mod decision_override;
pub mod explanation;
pub mod notification;
