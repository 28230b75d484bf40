//! Bias alert repository: creation from screener drafts, filtered listing,
//! status updates, reopen, and aggregate counts.

use std::collections::BTreeMap;

use trust_core::entities::{AlertDraft, BiasAlert};
use trust_core::enums::{DecisionType, InvestigationStatus, Severity};
use trust_core::ids::PREFIX_BIAS_ALERT;

use crate::Transaction;
use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_opt_string, get_u32, get_u64, now_micros, parse_datetime, parse_enum,
    sql_limit,
};
use crate::service::TrustService;

/// Filter criteria for alert listings.
#[derive(Debug, Default, Clone)]
pub struct AlertFilter {
    pub status: Option<InvestigationStatus>,
    pub severity: Option<Severity>,
    pub decision_id: Option<String>,
    pub decision_type: Option<DecisionType>,
    pub limit: Option<u32>,
}

fn row_to_alert(row: &libsql::Row) -> Result<BiasAlert, DatabaseError> {
    Ok(BiasAlert {
        id: row.get::<String>(0)?,
        decision_id: row.get::<String>(1)?,
        decision_type: parse_enum(&row.get::<String>(2)?)?,
        alert_type: parse_enum(&row.get::<String>(3)?)?,
        protected_attribute: get_opt_string(row, 4)?,
        metric_name: row.get::<String>(5)?,
        metric_value: row.get::<f64>(6)?,
        threshold: row.get::<f64>(7)?,
        severity: parse_enum(&row.get::<String>(8)?)?,
        investigation_status: parse_enum(&row.get::<String>(9)?)?,
        description: row.get::<String>(10)?,
        reopen_count: get_u32(row, 11)?,
        resolution_notes: get_opt_string(row, 12)?,
        created_at: parse_datetime(&row.get::<String>(13)?)?,
        updated_at: parse_datetime(&row.get::<String>(14)?)?,
    })
}

const SELECT_COLS: &str = "id, decision_id, decision_type, alert_type, protected_attribute, \
     metric_name, metric_value, threshold, severity, investigation_status, description, \
     reopen_count, resolution_notes, created_at, updated_at";

impl TrustService {
    /// Persist a screener draft as an open alert.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_bias_alert(
        &self,
        tx: &Transaction<'_>,
        draft: AlertDraft,
    ) -> Result<BiasAlert, DatabaseError> {
        let now = now_micros();
        let id = self.db().generate_id(PREFIX_BIAS_ALERT).await?;

        tx.execute(
            "INSERT INTO bias_alerts (id, decision_id, decision_type, alert_type, protected_attribute,
                 metric_name, metric_value, threshold, severity, investigation_status, description,
                 reopen_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'open', ?10, 0, ?11, ?11)",
            libsql::params![
                id.as_str(),
                draft.decision_id.as_str(),
                draft.decision_type.as_str(),
                draft.alert_type.as_str(),
                draft.protected_attribute.as_deref(),
                draft.metric_name.as_str(),
                draft.metric_value,
                draft.threshold,
                draft.severity.as_str(),
                draft.description.as_str(),
                format_timestamp(&now)
            ],
        )
        .await?;

        Ok(BiasAlert {
            id,
            decision_id: draft.decision_id,
            decision_type: draft.decision_type,
            alert_type: draft.alert_type,
            protected_attribute: draft.protected_attribute,
            metric_name: draft.metric_name,
            metric_value: draft.metric_value,
            threshold: draft.threshold,
            severity: draft.severity,
            investigation_status: InvestigationStatus::Open,
            description: draft.description,
            reopen_count: 0,
            resolution_notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an alert by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or row decoding fails.
    pub async fn get_bias_alert(&self, id: &str) -> Result<Option<BiasAlert>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM bias_alerts WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_alert(&row)?)),
            None => Ok(None),
        }
    }

    /// List alerts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_bias_alerts(&self, filter: &AlertFilter) -> Result<Vec<BiasAlert>, DatabaseError> {
        self.query_alerts(filter, false).await
    }

    /// Alerts still under review (`open` or `investigating`), newest first.
    /// `filter.status` narrows further when set.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_open_alerts(&self, filter: &AlertFilter) -> Result<Vec<BiasAlert>, DatabaseError> {
        self.query_alerts(filter, true).await
    }

    async fn query_alerts(
        &self,
        filter: &AlertFilter,
        only_open: bool,
    ) -> Result<Vec<BiasAlert>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if only_open {
            conditions.push("investigation_status IN ('open', 'investigating')".to_string());
        }
        if let Some(status) = filter.status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
            conditions.push(format!("investigation_status = ?{}", params.len()));
        }
        if let Some(severity) = filter.severity {
            params.push(libsql::Value::Text(severity.as_str().to_string()));
            conditions.push(format!("severity = ?{}", params.len()));
        }
        if let Some(ref decision_id) = filter.decision_id {
            params.push(libsql::Value::Text(decision_id.clone()));
            conditions.push(format!("decision_id = ?{}", params.len()));
        }
        if let Some(decision_type) = filter.decision_type {
            params.push(libsql::Value::Text(decision_type.as_str().to_string()));
            conditions.push(format!("decision_type = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = sql_limit(filter.limit, self.config().general.default_limit);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM bias_alerts {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut alerts = Vec::new();
        while let Some(row) = rows.next().await? {
            alerts.push(row_to_alert(&row)?);
        }
        Ok(alerts)
    }

    /// Every alert, oldest first (export).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn all_bias_alerts(&self) -> Result<Vec<BiasAlert>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM bias_alerts ORDER BY created_at ASC, rowid ASC");
        let mut rows = self.db().conn().query(&sql, ()).await?;
        let mut alerts = Vec::new();
        while let Some(row) = rows.next().await? {
            alerts.push(row_to_alert(&row)?);
        }
        Ok(alerts)
    }

    /// Set an alert's status. `notes`, when present, replaces the resolution
    /// notes. The caller validates the transition.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the alert does not exist.
    pub async fn update_alert_status(
        &self,
        tx: &Transaction<'_>,
        id: &str,
        status: InvestigationStatus,
        notes: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let changed = tx
            .execute(
                "UPDATE bias_alerts
                 SET investigation_status = ?1, resolution_notes = COALESCE(?2, resolution_notes), updated_at = ?3
                 WHERE id = ?4",
                libsql::params![status.as_str(), notes, format_timestamp(&now_micros()), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Move a closed alert back to `investigating`, bump `reopen_count`, and
    /// clear the resolution notes.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the alert does not exist.
    pub async fn reopen_alert(&self, tx: &Transaction<'_>, id: &str) -> Result<(), DatabaseError> {
        let changed = tx
            .execute(
                "UPDATE bias_alerts
                 SET investigation_status = 'investigating', reopen_count = reopen_count + 1,
                     resolution_notes = NULL, updated_at = ?1
                 WHERE id = ?2",
                libsql::params![format_timestamp(&now_micros()), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Alert counts grouped by investigation status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn alert_counts_by_status(&self) -> Result<BTreeMap<String, u32>, DatabaseError> {
        self.grouped_alert_counts(
            "SELECT investigation_status, COUNT(*) FROM bias_alerts GROUP BY investigation_status",
        )
        .await
    }

    /// Counts of alerts still under review, grouped by severity.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn open_alert_counts_by_severity(&self) -> Result<BTreeMap<String, u32>, DatabaseError> {
        self.grouped_alert_counts(
            "SELECT severity, COUNT(*) FROM bias_alerts
             WHERE investigation_status IN ('open', 'investigating')
             GROUP BY severity",
        )
        .await
    }

    async fn grouped_alert_counts(&self, sql: &str) -> Result<BTreeMap<String, u32>, DatabaseError> {
        let mut rows = self.db().conn().query(sql, ()).await?;
        let mut counts = BTreeMap::new();
        while let Some(row) = rows.next().await? {
            counts.insert(row.get::<String>(0)?, get_u32(&row, 1)?);
        }
        Ok(counts)
    }

    /// Count alerts still under review, optionally only for one user's
    /// decisions and only at one severity.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_open_alerts(
        &self,
        user_id: Option<&str>,
        severity: Option<Severity>,
    ) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM bias_alerts a JOIN decisions d ON d.id = a.decision_id
                 WHERE a.investigation_status IN ('open', 'investigating')
                   AND (?1 IS NULL OR d.user_id = ?1)
                   AND (?2 IS NULL OR a.severity = ?2)",
                libsql::params![user_id, severity.map(Severity::as_str)],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_u64(&row, 0)
    }

    /// Open or investigating alerts on one model's decisions.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_open_alerts_for_model(&self, model_name: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM bias_alerts a JOIN decisions d ON d.id = a.decision_id
                 WHERE a.investigation_status IN ('open', 'investigating')
                   AND d.model_name = ?1",
                [model_name],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_u64(&row, 0)
    }
}
