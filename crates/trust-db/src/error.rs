//! Database error types for trust-db.

use thiserror::Error;
use trust_core::errors::GovernanceError;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or a row could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A compare-and-set write found the row changed underneath it.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// JSON column encode/decode failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DatabaseError {
    /// Whether a write collided with an existing primary or unique key.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::LibSql(e) if e.to_string().contains("UNIQUE constraint failed"))
    }
}

impl From<DatabaseError> for GovernanceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(msg) => Self::Conflict(msg),
            other => {
                tracing::error!(error = %other, "storage failure");
                Self::Internal("storage failure".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trust_core::errors::ErrorKind;

    #[test]
    fn storage_detail_is_not_exposed() {
        let err: GovernanceError = DatabaseError::Query("no such table: decisions".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.to_response().message.contains("decisions"));
    }

    #[test]
    fn only_libsql_errors_classify_as_unique_violations() {
        assert!(!DatabaseError::Conflict("UNIQUE constraint failed".into()).is_unique_violation());
        assert!(!DatabaseError::NoResult.is_unique_violation());
    }

    #[test]
    fn conflict_keeps_its_kind() {
        let err: GovernanceError = DatabaseError::Conflict("decision dec-1 changed".into()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
