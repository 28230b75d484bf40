//! Decision override repository. Override rows are append-only; the chain for
//! one decision reads oldest first.

use trust_core::entities::DecisionOverride;
use trust_core::enums::{OverrideStatus, RiskLevel};
use trust_core::ids::PREFIX_OVERRIDE;

use crate::Transaction;
use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, get_opt_string, now_micros, parse_datetime, parse_enum};
use crate::service::TrustService;

/// An override ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewOverride {
    pub decision_id: String,
    pub requested_by: String,
    pub approved_by: String,
    pub target_user_id: String,
    pub old_outcome: String,
    pub new_outcome: String,
    pub reason: String,
    pub reviewer_notes: Option<String>,
    pub risk_level: RiskLevel,
}

fn row_to_override(row: &libsql::Row) -> Result<DecisionOverride, DatabaseError> {
    Ok(DecisionOverride {
        id: row.get::<String>(0)?,
        decision_id: row.get::<String>(1)?,
        requested_by: row.get::<String>(2)?,
        approved_by: row.get::<String>(3)?,
        target_user_id: row.get::<String>(4)?,
        old_outcome: row.get::<String>(5)?,
        new_outcome: row.get::<String>(6)?,
        reason: row.get::<String>(7)?,
        reviewer_notes: get_opt_string(row, 8)?,
        status: parse_enum(&row.get::<String>(9)?)?,
        risk_level: parse_enum(&row.get::<String>(10)?)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

const SELECT_COLS: &str = "id, decision_id, requested_by, approved_by, target_user_id, \
     old_outcome, new_outcome, reason, reviewer_notes, status, risk_level, created_at";

impl TrustService {
    /// Insert an applied override record inside `tx`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_override(
        &self,
        tx: &Transaction<'_>,
        new: NewOverride,
    ) -> Result<DecisionOverride, DatabaseError> {
        let now = now_micros();
        let id = self.db().generate_id(PREFIX_OVERRIDE).await?;
        let status = OverrideStatus::Applied;

        tx.execute(
            "INSERT INTO decision_overrides (id, decision_id, requested_by, approved_by, target_user_id,
                 old_outcome, new_outcome, reason, reviewer_notes, status, risk_level, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            libsql::params![
                id.as_str(),
                new.decision_id.as_str(),
                new.requested_by.as_str(),
                new.approved_by.as_str(),
                new.target_user_id.as_str(),
                new.old_outcome.as_str(),
                new.new_outcome.as_str(),
                new.reason.as_str(),
                new.reviewer_notes.as_deref(),
                status.as_str(),
                new.risk_level.as_str(),
                format_timestamp(&now)
            ],
        )
        .await?;

        Ok(DecisionOverride {
            id,
            decision_id: new.decision_id,
            requested_by: new.requested_by,
            approved_by: new.approved_by,
            target_user_id: new.target_user_id,
            old_outcome: new.old_outcome,
            new_outcome: new.new_outcome,
            reason: new.reason,
            reviewer_notes: new.reviewer_notes,
            status,
            risk_level: new.risk_level,
            created_at: now,
        })
    }

    /// The override chain of one decision, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_overrides(&self, decision_id: &str) -> Result<Vec<DecisionOverride>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM decision_overrides WHERE decision_id = ?1
             ORDER BY created_at ASC, rowid ASC"
        );
        self.collect_overrides(&sql, [decision_id]).await
    }

    /// Every override, oldest first (export).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn all_overrides(&self) -> Result<Vec<DecisionOverride>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM decision_overrides ORDER BY created_at ASC, rowid ASC");
        self.collect_overrides(&sql, ()).await
    }

    async fn collect_overrides(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<DecisionOverride>, DatabaseError> {
        let mut rows = self.db().conn().query(sql, params).await?;
        let mut overrides = Vec::new();
        while let Some(row) = rows.next().await? {
            overrides.push(row_to_override(&row)?);
        }
        Ok(overrides)
    }
}
