//! Engine error types.

use thiserror::Error;
use trust_core::errors::GovernanceError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The input payload is missing a field, has the wrong type, or is out of range.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No model serves this decision type.
    #[error("Unsupported decision type: {0}")]
    UnsupportedDecisionType(String),

    /// A model, explainer, or screener fault.
    #[error("Engine failure: {0}")]
    Internal(String),
}

impl From<EngineError> for GovernanceError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => Self::Validation(msg),
            EngineError::UnsupportedDecisionType(t) => Self::UnsupportedDecisionType(t),
            EngineError::Internal(msg) => Self::Internal(msg),
        }
    }
}
