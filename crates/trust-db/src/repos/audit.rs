//! Audit log repository.
//!
//! Append-only entries recording every governed action. The table rejects
//! UPDATE and DELETE through triggers, and this module exposes no mutation
//! besides the append. Appending never fails to the caller: a failed write is
//! reported on the `trustai::audit_gap` tracing target and the governed
//! action proceeds.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use trust_core::audit_detail::FailureDetail;
use trust_core::entities::AuditLog;
use trust_core::enums::{AuditAction, AuditStatus, ResourceType, RiskLevel};
use trust_core::errors::GovernanceError;
use trust_core::identity::{Caller, RequestOrigin};
use trust_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_opt_string, now_micros, parse_datetime, parse_enum, parse_optional_json,
    sql_limit,
};
use crate::service::TrustService;

/// Tracing target for audit writes that could not be persisted.
pub const AUDIT_GAP_TARGET: &str = "trustai::audit_gap";

/// An audit entry under construction. Status defaults to success and risk to
/// low.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub action: AuditAction,
    pub actor_id: Option<String>,
    pub origin: RequestOrigin,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<String>,
    pub details: Option<Value>,
    pub status: AuditStatus,
    pub risk_level: RiskLevel,
}

impl AuditRecord {
    /// Start a record for `action` on behalf of `caller`.
    #[must_use]
    pub fn new(action: AuditAction, caller: &Caller) -> Self {
        Self {
            action,
            actor_id: caller.actor_id().map(String::from),
            origin: caller.origin.clone(),
            resource_type: None,
            resource_id: None,
            details: None,
            status: AuditStatus::Success,
            risk_level: RiskLevel::Low,
        }
    }

    #[must_use]
    pub fn resource(mut self, resource_type: ResourceType, resource_id: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type);
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Attach a typed detail payload.
    #[must_use]
    pub fn details<T: Serialize>(mut self, details: &T) -> Self {
        match serde_json::to_value(details) {
            Ok(value) => self.details = Some(value),
            Err(e) => {
                tracing::warn!(target: AUDIT_GAP_TARGET, action = %self.action, error = %e, "audit details not serializable");
            }
        }
        self
    }

    #[must_use]
    pub const fn risk(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    #[must_use]
    pub const fn status(mut self, status: AuditStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark the record as a failed attempt, carrying the error kind and the
    /// caller-safe message.
    #[must_use]
    pub fn failure(self, err: &GovernanceError) -> Self {
        let response = err.to_response();
        self.status(AuditStatus::Failure).details(&FailureDetail {
            error_kind: response.kind,
            message: response.message,
        })
    }

    fn into_log(self, id: String, created_at: DateTime<Utc>) -> AuditLog {
        AuditLog {
            id,
            actor_id: self.actor_id,
            action_type: self.action,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            status: self.status,
            risk_level: self.risk_level,
            details: self.details,
            ip_address: self.origin.ip_address,
            user_agent: self.origin.user_agent,
            created_at,
        }
    }
}

/// Filter criteria for audit queries.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub actor_id: Option<String>,
    pub action: Option<AuditAction>,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<String>,
    pub status: Option<AuditStatus>,
    pub risk_level: Option<RiskLevel>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditLog, DatabaseError> {
    let resource_type = get_opt_string(row, 3)?
        .map(|s| parse_enum::<ResourceType>(&s))
        .transpose()?;
    Ok(AuditLog {
        id: row.get::<String>(0)?,
        actor_id: get_opt_string(row, 1)?,
        action_type: parse_enum(&row.get::<String>(2)?)?,
        resource_type,
        resource_id: get_opt_string(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        risk_level: parse_enum(&row.get::<String>(6)?)?,
        details: parse_optional_json(get_opt_string(row, 7)?.as_deref())?,
        ip_address: get_opt_string(row, 8)?,
        user_agent: get_opt_string(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn report_gap(entry: &AuditLog, err: &DatabaseError) {
    tracing::error!(
        target: AUDIT_GAP_TARGET,
        audit_id = %entry.id,
        action = %entry.action_type,
        resource_id = entry.resource_id.as_deref().unwrap_or(""),
        error = %err,
        "audit entry was not persisted"
    );
}

const SELECT_COLS: &str = "id, actor_id, action_type, resource_type, resource_id, status, \
     risk_level, details, ip_address, user_agent, created_at";

impl TrustService {
    /// Build and append an audit entry. Never fails to the caller.
    pub async fn record_audit(&self, record: AuditRecord) {
        let id = match self.db().generate_id(PREFIX_AUDIT).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(target: AUDIT_GAP_TARGET, action = %record.action, error = %e, "audit id generation failed");
                return;
            }
        };
        self.record_audit_with_id(record, id).await;
    }

    /// Append `record` under `id`, retrying once under a fresh id if `id` is
    /// already taken.
    pub(crate) async fn record_audit_with_id(&self, record: AuditRecord, id: String) {
        let entry = record.clone().into_log(id, now_micros());
        match self.try_append_audit_log(&entry).await {
            Err(e) if e.is_unique_violation() => {
                tracing::warn!(target: AUDIT_GAP_TARGET, audit_id = %entry.id, "audit id collision; retrying");
                match self.db().generate_id(PREFIX_AUDIT).await {
                    Ok(fresh) => {
                        let retry = record.into_log(fresh, entry.created_at);
                        self.append_audit_log(&retry).await;
                    }
                    Err(e) => report_gap(&entry, &e),
                }
            }
            Err(e) => report_gap(&entry, &e),
            Ok(()) => {}
        }
    }

    /// Append one entry in its own short transaction. Never fails to the
    /// caller. Must not be called while the caller holds a transaction.
    pub async fn append_audit_log(&self, entry: &AuditLog) {
        if let Err(e) = self.try_append_audit_log(entry).await {
            report_gap(entry, &e);
        }
    }

    async fn try_append_audit_log(&self, entry: &AuditLog) -> Result<(), DatabaseError> {
        let details = entry.details.as_ref().map(Value::to_string);
        let tx = self.db().begin().await?;
        let inserted = tx
            .execute(
                "INSERT INTO audit_logs (id, actor_id, action_type, resource_type, resource_id, status,
                     risk_level, details, ip_address, user_agent, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                libsql::params![
                    entry.id.as_str(),
                    entry.actor_id.as_deref(),
                    entry.action_type.as_str(),
                    entry.resource_type.map(ResourceType::as_str),
                    entry.resource_id.as_deref(),
                    entry.status.as_str(),
                    entry.risk_level.as_str(),
                    details.as_deref(),
                    entry.ip_address.as_deref(),
                    entry.user_agent.as_deref(),
                    format_timestamp(&entry.created_at)
                ],
            )
            .await;
        match inserted {
            Ok(_) => tx.commit().await,
            Err(e) => {
                tx.abandon().await;
                Err(e)
            }
        }
    }

    /// Get one audit entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or row decoding fails.
    pub async fn get_audit_log(&self, id: &str) -> Result<Option<AuditLog>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM audit_logs WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_audit(&row)?)),
            None => Ok(None),
        }
    }

    /// Query audit entries, newest first (ties broken by insertion order).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref actor_id) = filter.actor_id {
            params.push(libsql::Value::Text(actor_id.clone()));
            conditions.push(format!("actor_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action_type = ?{}", params.len()));
        }
        if let Some(resource_type) = filter.resource_type {
            params.push(libsql::Value::Text(resource_type.as_str().to_string()));
            conditions.push(format!("resource_type = ?{}", params.len()));
        }
        if let Some(ref resource_id) = filter.resource_id {
            params.push(libsql::Value::Text(resource_id.clone()));
            conditions.push(format!("resource_id = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
            conditions.push(format!("status = ?{}", params.len()));
        }
        if let Some(risk_level) = filter.risk_level {
            params.push(libsql::Value::Text(risk_level.as_str().to_string()));
            conditions.push(format!("risk_level = ?{}", params.len()));
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
            "SELECT {SELECT_COLS} FROM audit_logs {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{officer, test_service};
    use pretty_assertions::assert_eq;
    use trust_core::audit_detail::OverrideDetail;
    use trust_core::errors::ErrorKind;

    #[tokio::test]
    async fn record_and_read_back() {
        let svc = test_service().await;
        let caller = officer();
        svc.record_audit(
            AuditRecord::new(AuditAction::DecisionOverride, &caller)
                .resource(ResourceType::Decision, "dec-1")
                .risk(RiskLevel::High)
                .details(&OverrideDetail {
                    old_outcome: "denied".into(),
                    new_outcome: "approved".into(),
                    reason: "manual review passed".into(),
                    requested_risk_level: RiskLevel::High,
                }),
        )
        .await;

        let entries = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.action_type, AuditAction::DecisionOverride);
        assert_eq!(entry.actor_id.as_deref(), Some("usr-officer"));
        assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(entry.status, AuditStatus::Success);
        assert_eq!(entry.risk_level, RiskLevel::High);
        assert_eq!(entry.details.as_ref().unwrap()["old_outcome"], "denied");

        let again = svc.get_audit_log(&entry.id).await.unwrap().unwrap();
        assert_eq!(&again, entry);
    }

    #[tokio::test]
    async fn failure_records_kind() {
        let svc = test_service().await;
        let err = GovernanceError::not_found("decision", "dec-missing");
        svc.record_audit(
            AuditRecord::new(AuditAction::DecisionOverride, &Caller::system())
                .resource(ResourceType::Decision, "dec-missing")
                .failure(&err),
        )
        .await;

        let entries = svc
            .query_audit_logs(&AuditFilter {
                status: Some(AuditStatus::Failure),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].actor_id.is_none());
        let details = entries[0].details.as_ref().unwrap();
        assert_eq!(details["error_kind"], ErrorKind::NotFound.as_str());
    }

    #[tokio::test]
    async fn newest_first_with_stable_ties() {
        let svc = test_service().await;
        let caller = officer();
        for resource in ["dec-1", "dec-2", "dec-3"] {
            svc.record_audit(
                AuditRecord::new(AuditAction::AiDecision, &caller)
                    .resource(ResourceType::Decision, resource),
            )
            .await;
        }
        let entries = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
        let resources: Vec<_> = entries
            .iter()
            .map(|e| e.resource_id.as_deref().unwrap())
            .collect();
        assert_eq!(resources, vec!["dec-3", "dec-2", "dec-1"]);

        let filtered = svc
            .query_audit_logs(&AuditFilter {
                resource_id: Some("dec-2".into()),
                limit: Some(5),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_append_is_swallowed() {
        let svc = test_service().await;
        svc.record_audit(AuditRecord::new(AuditAction::Login, &officer())).await;
        let entry = svc.query_audit_logs(&AuditFilter::default()).await.unwrap().remove(0);

        // Same primary key: the insert fails, the call still returns.
        svc.append_audit_log(&entry).await;
        assert_eq!(svc.query_audit_logs(&AuditFilter::default()).await.unwrap().len(), 1);

        // The gate was released: later writes still work.
        svc.record_audit(AuditRecord::new(AuditAction::Logout, &officer())).await;
        assert_eq!(svc.query_audit_logs(&AuditFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn colliding_id_is_retried_under_a_fresh_one() {
        let svc = test_service().await;
        svc.record_audit(AuditRecord::new(AuditAction::Login, &officer())).await;
        let taken = svc.query_audit_logs(&AuditFilter::default()).await.unwrap().remove(0);

        let err = svc.try_append_audit_log(&taken).await.unwrap_err();
        assert!(err.is_unique_violation(), "{err}");

        svc.record_audit_with_id(
            AuditRecord::new(AuditAction::Logout, &officer()),
            taken.id.clone(),
        )
        .await;

        let entries = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action_type, AuditAction::Logout);
        assert_ne!(entries[0].id, taken.id);
        assert_eq!(svc.get_audit_log(&taken.id).await.unwrap(), Some(taken));
    }

    #[tokio::test]
    async fn table_rejects_update_and_delete() {
        let svc = test_service().await;
        svc.record_audit(AuditRecord::new(AuditAction::Login, &officer())).await;

        let tx = svc.db().begin().await.unwrap();
        assert!(tx.execute("UPDATE audit_logs SET status = 'failure'", ()).await.is_err());
        assert!(tx.execute("DELETE FROM audit_logs", ()).await.is_err());
        tx.rollback().await.unwrap();

        let entries = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, AuditStatus::Success);
    }
}
