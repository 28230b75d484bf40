//! Governance error taxonomy.
//!
//! Every governed operation fails with a [`GovernanceError`]. Crate-local
//! errors (`EngineError` in trust-engine, `DatabaseError` in trust-db) convert
//! into it at the service boundary. Callers only ever see the stable
//! [`ErrorKind`] and a message via [`GovernanceError::to_response`]; storage
//! and internal detail stays in the operational log.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable failure kind exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    UnsupportedDecisionType,
    Permission,
    InvalidTransition,
    Conflict,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::UnsupportedDecisionType => "unsupported_decision_type",
            Self::Permission => "permission",
            Self::InvalidTransition => "invalid_transition",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by governed operations.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Bad or missing caller input. No state was mutated.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// The decision type is not recognized by the engine.
    #[error("Unsupported decision type: {0}")]
    UnsupportedDecisionType(String),

    /// The actor lacks a required role or consent. Raised at the boundary.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// The entity changed between read and write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An engine, explainer, screener, or storage fault. The message is
    /// already sanitized for callers.
    #[error("Internal failure: {0}")]
    Internal(String),
}

impl GovernanceError {
    /// Shorthand for [`GovernanceError::NotFound`].
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UnsupportedDecisionType(_) => ErrorKind::UnsupportedDecisionType,
            Self::Permission(_) => ErrorKind::Permission,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Structured, caller-safe form of this error.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// User-visible failure payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(
            GovernanceError::Validation("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            GovernanceError::not_found("decision", "dec-1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            GovernanceError::UnsupportedDecisionType("mortgage".into()).kind(),
            ErrorKind::UnsupportedDecisionType
        );
    }

    #[test]
    fn response_carries_kind_and_message() {
        let response = GovernanceError::not_found("decision", "dec-00000001").to_response();
        assert_eq!(response.kind, ErrorKind::NotFound);
        assert_eq!(response.message, "Entity not found: decision dec-00000001");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "not_found");
    }
}
