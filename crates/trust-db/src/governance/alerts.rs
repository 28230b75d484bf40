//! Bias alert lifecycle and the aggregate fairness view.

use trust_core::audit_detail::StatusChangedDetail;
use trust_core::entities::BiasAlert;
use trust_core::enums::{AuditAction, DecisionType, InvestigationStatus, ResourceType, RiskLevel};
use trust_core::errors::GovernanceError;
use trust_core::identity::Caller;
use trust_core::responses::BiasMetricsSnapshot;
use trust_engine::OutcomeHistory;

use crate::Transaction;
use crate::governance::{audits_failure, fairness_score};
use crate::helpers::now_micros;
use crate::repos::audit::AuditRecord;
use crate::service::TrustService;

const ENTITY: &str = "bias_alert";

/// Dismissing an alert closes it without a finding, so it carries more risk
/// than any other move.
const fn transition_risk(to: InvestigationStatus) -> RiskLevel {
    match to {
        InvestigationStatus::Dismissed => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

impl TrustService {
    /// Advance an alert along `open -> investigating -> resolved | dismissed`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the alert does not exist.
    /// - `InvalidTransition` for any other move, including backwards ones.
    pub async fn transition_bias_alert(
        &self,
        caller: &Caller,
        alert_id: &str,
        to: InvestigationStatus,
        notes: Option<String>,
    ) -> Result<BiasAlert, GovernanceError> {
        let notes = notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        let audit = AuditRecord::new(AuditAction::BiasAlertUpdate, caller)
            .resource(ResourceType::BiasAlert, alert_id)
            .risk(transition_risk(to));

        let tx = self.db().begin().await?;
        let moved = self.move_alert(&tx, alert_id, to, notes.as_deref()).await;
        self.finish_alert_change(tx, moved, audit, alert_id, notes).await
    }

    /// Reopen a resolved or dismissed alert: it returns to `investigating`
    /// and its `reopen_count` goes up by one.
    ///
    /// # Errors
    ///
    /// - `Validation` if `reason` is blank.
    /// - `NotFound` if the alert does not exist.
    /// - `InvalidTransition` if the alert is not closed.
    pub async fn reopen_bias_alert(
        &self,
        caller: &Caller,
        alert_id: &str,
        reason: &str,
    ) -> Result<BiasAlert, GovernanceError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(GovernanceError::Validation("reopening an alert needs a reason".into()));
        }
        let audit = AuditRecord::new(AuditAction::BiasAlertUpdate, caller)
            .resource(ResourceType::BiasAlert, alert_id)
            .risk(RiskLevel::Medium);

        let tx = self.db().begin().await?;
        let reopened = self.reopen_closed_alert(&tx, alert_id).await;
        self.finish_alert_change(tx, reopened, audit, alert_id, Some(reason.to_string()))
            .await
    }

    async fn move_alert(
        &self,
        tx: &Transaction<'_>,
        alert_id: &str,
        to: InvestigationStatus,
        notes: Option<&str>,
    ) -> Result<InvestigationStatus, GovernanceError> {
        let alert = self
            .get_bias_alert(alert_id)
            .await?
            .ok_or_else(|| GovernanceError::not_found(ENTITY, alert_id))?;
        let from = alert.investigation_status;
        if !from.can_transition_to(to) {
            return Err(invalid_transition(alert_id, from, to));
        }
        self.update_alert_status(tx, alert_id, to, notes).await?;
        Ok(from)
    }

    async fn reopen_closed_alert(
        &self,
        tx: &Transaction<'_>,
        alert_id: &str,
    ) -> Result<InvestigationStatus, GovernanceError> {
        let alert = self
            .get_bias_alert(alert_id)
            .await?
            .ok_or_else(|| GovernanceError::not_found(ENTITY, alert_id))?;
        let from = alert.investigation_status;
        if !from.can_reopen() {
            return Err(invalid_transition(alert_id, from, InvestigationStatus::Investigating));
        }
        self.reopen_alert(tx, alert_id).await?;
        Ok(from)
    }

    /// Commit or roll back a status change, audit it, and return the alert
    /// as stored.
    async fn finish_alert_change(
        &self,
        tx: Transaction<'_>,
        changed: Result<InvestigationStatus, GovernanceError>,
        audit: AuditRecord,
        alert_id: &str,
        reason: Option<String>,
    ) -> Result<BiasAlert, GovernanceError> {
        let from = match changed {
            Ok(from) => tx.commit().await.map(|()| from).map_err(GovernanceError::from),
            Err(e) => {
                tx.abandon().await;
                Err(e)
            }
        };
        let from = match from {
            Ok(from) => from,
            Err(err) => {
                if audits_failure(&err) {
                    self.record_audit(audit.failure(&err)).await;
                }
                return Err(err);
            }
        };

        let alert = self
            .get_bias_alert(alert_id)
            .await?
            .ok_or_else(|| GovernanceError::not_found(ENTITY, alert_id))?;
        tracing::debug!(alert_id, from = %from, to = %alert.investigation_status, "alerts: status changed");
        self.record_audit(audit.details(&StatusChangedDetail {
            from: from.as_str().to_string(),
            to: alert.investigation_status.as_str().to_string(),
            reason,
        }))
        .await;
        Ok(alert)
    }

    /// Open alerts by severity, alerts by status, the fairness score, and
    /// favorable-outcome rates per decision type over the screening window.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a query fails.
    pub async fn current_bias_metrics(&self) -> Result<BiasMetricsSnapshot, GovernanceError> {
        let open_alerts_by_severity = self.open_alert_counts_by_severity().await?;
        let alerts_by_status = self.alert_counts_by_status().await?;
        let average_accuracy = self.average_explanation_accuracy(None).await?;

        let bias = &self.config().bias;
        let mut decision_types = Vec::new();
        for decision_type in DecisionType::ALL {
            let recent = self
                .recent_decisions_of_type(decision_type, bias.history_window)
                .await?;
            if recent.is_empty() {
                continue;
            }
            let history =
                OutcomeHistory::from_decisions(decision_type, &bias.protected_attributes, &recent);
            decision_types.push(self.screener().fairness_summary(&history));
        }

        Ok(BiasMetricsSnapshot {
            open_alerts_by_severity,
            alerts_by_status,
            average_accuracy,
            fairness_score: fairness_score(average_accuracy),
            decision_types,
            generated_at: now_micros(),
        })
    }
}

fn invalid_transition(id: &str, from: InvestigationStatus, to: InvestigationStatus) -> GovernanceError {
    GovernanceError::InvalidTransition {
        entity_type: ENTITY.to_string(),
        id: id.to_string(),
        from: from.as_str().to_string(),
        to: to.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{officer, seed_decision, test_service};
    use pretty_assertions::assert_eq;
    use trust_core::entities::AlertDraft;
    use trust_core::enums::{AlertType, AuditStatus, Severity};
    use trust_core::errors::ErrorKind;

    async fn seed_alert(svc: &TrustService) -> BiasAlert {
        let decision = seed_decision(svc, "usr-1").await;
        let tx = svc.db().begin().await.unwrap();
        let alert = svc
            .create_bias_alert(
                &tx,
                AlertDraft {
                    decision_id: decision.id.clone(),
                    decision_type: decision.decision_type,
                    alert_type: AlertType::AccuracyDegradation,
                    protected_attribute: None,
                    metric_name: "overall_accuracy".into(),
                    metric_value: 0.72,
                    threshold: 0.75,
                    severity: Severity::Medium,
                    description: "accuracy below threshold".into(),
                },
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();
        alert
    }

    #[tokio::test]
    async fn lifecycle_moves_forward_only() {
        let svc = test_service().await;
        let alert = seed_alert(&svc).await;
        let caller = officer();

        let investigating = svc
            .transition_bias_alert(&caller, &alert.id, InvestigationStatus::Investigating, None)
            .await
            .unwrap();
        assert_eq!(investigating.investigation_status, InvestigationStatus::Investigating);

        let resolved = svc
            .transition_bias_alert(
                &caller,
                &alert.id,
                InvestigationStatus::Resolved,
                Some("model retrained".into()),
            )
            .await
            .unwrap();
        assert_eq!(resolved.investigation_status, InvestigationStatus::Resolved);
        assert_eq!(resolved.resolution_notes.as_deref(), Some("model retrained"));

        let err = svc
            .transition_bias_alert(&caller, &alert.id, InvestigationStatus::Open, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        let unchanged = svc.get_bias_alert(&alert.id).await.unwrap().unwrap();
        assert_eq!(unchanged.investigation_status, InvestigationStatus::Resolved);

        let logs = svc
            .query_audit_logs(&AuditFilter {
                action: Some(AuditAction::BiasAlertUpdate),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].status, AuditStatus::Failure);
        assert_eq!(logs[1].details.as_ref().unwrap()["to"], "resolved");
    }

    #[tokio::test]
    async fn open_alert_cannot_skip_investigation() {
        let svc = test_service().await;
        let alert = seed_alert(&svc).await;
        let err = svc
            .transition_bias_alert(&officer(), &alert.id, InvestigationStatus::Resolved, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn dismissal_is_medium_risk_and_reopen_counts() {
        let svc = test_service().await;
        let alert = seed_alert(&svc).await;
        let caller = officer();
        svc.transition_bias_alert(&caller, &alert.id, InvestigationStatus::Investigating, None)
            .await
            .unwrap();
        svc.transition_bias_alert(&caller, &alert.id, InvestigationStatus::Dismissed, None)
            .await
            .unwrap();

        let latest = svc
            .query_audit_logs(&AuditFilter {
                limit: Some(1),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(latest[0].risk_level, RiskLevel::Medium);

        let reopened = svc
            .reopen_bias_alert(&caller, &alert.id, "new evidence")
            .await
            .unwrap();
        assert_eq!(reopened.investigation_status, InvestigationStatus::Investigating);
        assert_eq!(reopened.reopen_count, 1);

        let err = svc
            .reopen_bias_alert(&caller, &alert.id, "again")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);

        let err = svc.reopen_bias_alert(&caller, &alert.id, " ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn unknown_alert_is_not_found() {
        let svc = test_service().await;
        let err = svc
            .transition_bias_alert(&officer(), "bal-00000000", InvestigationStatus::Investigating, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn metrics_summarize_alerts_and_types() {
        let svc = test_service().await;
        seed_alert(&svc).await;

        let metrics = svc.current_bias_metrics().await.unwrap();
        assert_eq!(metrics.open_alerts_by_severity.get("medium"), Some(&1));
        assert_eq!(metrics.alerts_by_status.get("open"), Some(&1));
        assert_eq!(metrics.average_accuracy, None);
        assert_eq!(metrics.fairness_score, 0);
        assert_eq!(metrics.decision_types.len(), 1);
        assert_eq!(metrics.decision_types[0].decision_type, DecisionType::LoanApproval);
        assert_eq!(metrics.decision_types[0].total, 1);
    }
}
