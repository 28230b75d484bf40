//! Decision repository: insert, lookup, filtered listing, and the
//! compare-and-set outcome update used by overrides.

use chrono::{DateTime, Utc};
use serde_json::Value;

use trust_core::entities::Decision;
use trust_core::enums::DecisionType;
use trust_core::ids::PREFIX_DECISION;
use trust_engine::DecisionResult;

use crate::Transaction;
use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_u64, now_micros, parse_datetime, parse_enum, parse_json, sql_limit,
};
use crate::service::TrustService;

/// A decision ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewDecision {
    pub user_id: String,
    pub decision_type: DecisionType,
    pub model_name: String,
    pub model_version: String,
    pub outcome: String,
    pub confidence_score: f64,
    pub processing_time_ms: u64,
    pub input_data: Value,
    pub metadata: Value,
}

impl NewDecision {
    /// Pair an engine result with the subject and the input it was computed from.
    pub fn from_result(user_id: impl Into<String>, input_data: Value, result: DecisionResult) -> Self {
        Self {
            user_id: user_id.into(),
            decision_type: result.decision_type,
            model_name: result.model_name,
            model_version: result.model_version,
            outcome: result.outcome,
            confidence_score: result.confidence,
            processing_time_ms: result.processing_time_ms,
            input_data,
            metadata: result.metadata,
        }
    }
}

/// Filter criteria for decision listings.
#[derive(Debug, Default, Clone)]
pub struct DecisionFilter {
    pub user_id: Option<String>,
    pub decision_type: Option<DecisionType>,
    pub outcome: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

fn row_to_decision(row: &libsql::Row) -> Result<Decision, DatabaseError> {
    Ok(Decision {
        id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        decision_type: parse_enum(&row.get::<String>(2)?)?,
        model_name: row.get::<String>(3)?,
        model_version: row.get::<String>(4)?,
        outcome: row.get::<String>(5)?,
        confidence_score: row.get::<f64>(6)?,
        processing_time_ms: get_u64(row, 7)?,
        input_data: parse_json(&row.get::<String>(8)?)?,
        metadata: parse_json(&row.get::<String>(9)?)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

const SELECT_COLS: &str = "id, user_id, decision_type, model_name, model_version, outcome, \
     confidence_score, processing_time_ms, input_data, metadata, created_at, updated_at";

impl TrustService {
    /// Insert a decision inside `tx`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails (e.g. confidence outside [0,1]).
    pub async fn create_decision(
        &self,
        tx: &Transaction<'_>,
        new: NewDecision,
    ) -> Result<Decision, DatabaseError> {
        let now = now_micros();
        let id = self.db().generate_id(PREFIX_DECISION).await?;
        let processing_time_ms = i64::try_from(new.processing_time_ms).unwrap_or(i64::MAX);

        tx.execute(
            "INSERT INTO decisions (id, user_id, decision_type, model_name, model_version, outcome,
                 confidence_score, processing_time_ms, input_data, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            libsql::params![
                id.as_str(),
                new.user_id.as_str(),
                new.decision_type.as_str(),
                new.model_name.as_str(),
                new.model_version.as_str(),
                new.outcome.as_str(),
                new.confidence_score,
                processing_time_ms,
                serde_json::to_string(&new.input_data)?,
                serde_json::to_string(&new.metadata)?,
                format_timestamp(&now)
            ],
        )
        .await?;

        Ok(Decision {
            id,
            user_id: new.user_id,
            decision_type: new.decision_type,
            model_name: new.model_name,
            model_version: new.model_version,
            outcome: new.outcome,
            confidence_score: new.confidence_score,
            processing_time_ms: new.processing_time_ms,
            input_data: new.input_data,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a decision by ID.
    ///
    /// Reads share the connection with any open write transaction and see
    /// its uncommitted rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or row decoding fails.
    pub async fn get_decision(&self, id: &str) -> Result<Option<Decision>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM decisions WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_decision(&row)?)),
            None => Ok(None),
        }
    }

    /// Replace a decision's outcome only if it still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Conflict` when no row matched `id` and `expected`.
    pub async fn update_decision_outcome(
        &self,
        tx: &Transaction<'_>,
        id: &str,
        expected: &str,
        new_outcome: &str,
    ) -> Result<DateTime<Utc>, DatabaseError> {
        let now = now_micros();
        let changed = tx
            .execute(
                "UPDATE decisions SET outcome = ?1, updated_at = ?2 WHERE id = ?3 AND outcome = ?4",
                libsql::params![new_outcome, format_timestamp(&now), id, expected],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::Conflict(format!(
                "decision {id} no longer has outcome '{expected}'"
            )));
        }
        Ok(now)
    }

    /// List decisions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_decisions(&self, filter: &DecisionFilter) -> Result<Vec<Decision>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref user_id) = filter.user_id {
            params.push(libsql::Value::Text(user_id.clone()));
            conditions.push(format!("user_id = ?{}", params.len()));
        }
        if let Some(decision_type) = filter.decision_type {
            params.push(libsql::Value::Text(decision_type.as_str().to_string()));
            conditions.push(format!("decision_type = ?{}", params.len()));
        }
        if let Some(ref outcome) = filter.outcome {
            params.push(libsql::Value::Text(outcome.clone()));
            conditions.push(format!("outcome = ?{}", params.len()));
        }
        if let Some(ref since) = filter.since {
            params.push(libsql::Value::Text(format_timestamp(since)));
            conditions.push(format!("created_at >= ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = sql_limit(filter.limit, self.config().general.default_limit);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM decisions {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            decisions.push(row_to_decision(&row)?);
        }
        Ok(decisions)
    }

    /// The most recent `window` decisions of one type, newest first. Feeds the
    /// screener's outcome history.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn recent_decisions_of_type(
        &self,
        decision_type: DecisionType,
        window: u32,
    ) -> Result<Vec<Decision>, DatabaseError> {
        self.list_decisions(&DecisionFilter {
            decision_type: Some(decision_type),
            limit: Some(window),
            ..DecisionFilter::default()
        })
        .await
    }

    /// Every decision, oldest first (export).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn all_decisions(&self) -> Result<Vec<Decision>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM decisions ORDER BY created_at ASC, rowid ASC");
        let mut rows = self.db().conn().query(&sql, ()).await?;
        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            decisions.push(row_to_decision(&row)?);
        }
        Ok(decisions)
    }

    /// Count decisions, optionally for one user and since a point in time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_decisions(
        &self,
        user_id: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM decisions
                 WHERE (?1 IS NULL OR user_id = ?1) AND (?2 IS NULL OR created_at >= ?2)",
                libsql::params![user_id, since.as_ref().map(format_timestamp)],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_u64(&row, 0)
    }

    /// Decision count per outcome for one model.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn outcome_counts_for_model(
        &self,
        model_name: &str,
    ) -> Result<Vec<(String, u64)>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT outcome, COUNT(*) FROM decisions WHERE model_name = ?1
                 GROUP BY outcome ORDER BY outcome",
                [model_name],
            )
            .await?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next().await? {
            counts.push((row.get::<String>(0)?, get_u64(&row, 1)?));
        }
        Ok(counts)
    }

    /// Average confidence of one model's decisions, `None` if it has none.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn average_confidence_for_model(&self, model_name: &str) -> Result<Option<f64>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT AVG(confidence_score) FROM decisions WHERE model_name = ?1",
                [model_name],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<Option<f64>>(0)?)
    }

    /// Creation times of decisions since `since`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn decision_times_since(
        &self,
        user_id: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT created_at FROM decisions
                 WHERE (?1 IS NULL OR user_id = ?1) AND created_at >= ?2
                 ORDER BY created_at ASC",
                libsql::params![user_id, format_timestamp(&since)],
            )
            .await?;
        let mut times = Vec::new();
        while let Some(row) = rows.next().await? {
            times.push(parse_datetime(&row.get::<String>(0)?)?);
        }
        Ok(times)
    }
}
