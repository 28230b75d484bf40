//! # trust-core
//!
//! Core types, ID prefixes, and error types for the TrustAI governance core.
//!
//! This crate provides the foundational types shared across all TrustAI crates:
//! - Entity structs for governed objects (decisions, explanations, bias alerts,
//!   overrides, audit log entries, notification preferences, consents)
//! - Status enums with state machine transitions
//! - ID prefix constants
//! - The governance error taxonomy and its user-visible response shape
//! - Caller identity and the boundary authorization check
//! - Audit detail sub-types
//! - Response types returned by governed operations

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod responses;
