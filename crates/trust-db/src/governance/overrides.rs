//! Override workflow: replace a decision's outcome with full provenance.

use trust_core::audit_detail::OverrideDetail;
use trust_core::entities::DecisionOverride;
use trust_core::enums::{AuditAction, ResourceType, RiskLevel};
use trust_core::errors::GovernanceError;
use trust_core::identity::{Actor, Caller};
use trust_core::responses::OverrideOutcome;

use crate::Transaction;
use crate::governance::audits_failure;
use crate::repos::audit::AuditRecord;
use crate::repos::decision_override::NewOverride;
use crate::service::TrustService;

/// A reviewer's request to change a decision's outcome.
#[derive(Debug, Clone)]
pub struct OverrideRequest {
    pub decision_id: String,
    pub new_outcome: String,
    pub reason: String,
    pub risk_level: RiskLevel,
    pub reviewer_notes: Option<String>,
}

impl TrustService {
    /// Override a decision's outcome.
    ///
    /// Reads the decision, compare-and-sets its outcome, and inserts the
    /// override record in one transaction. Audited as `decision_override`,
    /// at high risk when the requested risk level is elevated.
    ///
    /// # Errors
    ///
    /// - `Validation` without an actor, with a blank outcome or reason, or
    ///   when the new outcome equals the current one.
    /// - `NotFound` if the decision does not exist.
    /// - `Conflict` if the outcome changed underneath the read.
    pub async fn override_decision(
        &self,
        caller: &Caller,
        request: OverrideRequest,
    ) -> Result<OverrideOutcome, GovernanceError> {
        let actor = caller.require_actor("decision override")?;
        let new_outcome = request.new_outcome.trim();
        if new_outcome.is_empty() {
            return Err(GovernanceError::Validation("new outcome is required".into()));
        }
        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(GovernanceError::Validation("override reason is required".into()));
        }

        let audit_risk = if request.risk_level.is_elevated() {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };
        let audit = AuditRecord::new(AuditAction::DecisionOverride, caller)
            .resource(ResourceType::Decision, request.decision_id.as_str())
            .risk(audit_risk);

        let tx = self.db().begin().await?;
        let applied = self
            .apply_override(&tx, actor, &request, new_outcome, reason)
            .await;
        let applied = match applied {
            Ok(outcome) => tx.commit().await.map(|()| outcome).map_err(GovernanceError::from),
            Err(e) => {
                tx.abandon().await;
                Err(e)
            }
        };

        match applied {
            Ok(outcome) => {
                let record = &outcome.override_record;
                tracing::debug!(
                    decision_id = %record.decision_id,
                    override_id = %record.id,
                    old = %record.old_outcome,
                    new = %record.new_outcome,
                    "override: applied"
                );
                self.record_audit(audit.details(&OverrideDetail {
                    old_outcome: record.old_outcome.clone(),
                    new_outcome: record.new_outcome.clone(),
                    reason: record.reason.clone(),
                    requested_risk_level: request.risk_level,
                }))
                .await;
                Ok(outcome)
            }
            Err(err) => {
                if audits_failure(&err) {
                    self.record_audit(audit.failure(&err)).await;
                }
                Err(err)
            }
        }
    }

    async fn apply_override(
        &self,
        tx: &Transaction<'_>,
        actor: &Actor,
        request: &OverrideRequest,
        new_outcome: &str,
        reason: &str,
    ) -> Result<OverrideOutcome, GovernanceError> {
        let mut decision = self
            .get_decision(&request.decision_id)
            .await?
            .ok_or_else(|| GovernanceError::not_found("decision", &request.decision_id))?;
        if decision.outcome == new_outcome {
            return Err(GovernanceError::Validation(format!(
                "decision {} already has outcome '{new_outcome}'",
                decision.id
            )));
        }

        let old_outcome = decision.outcome.clone();
        let updated_at = self
            .update_decision_outcome(tx, &decision.id, &old_outcome, new_outcome)
            .await?;
        let override_record = self
            .create_override(
                tx,
                NewOverride {
                    decision_id: decision.id.clone(),
                    requested_by: actor.user_id.clone(),
                    approved_by: actor.user_id.clone(),
                    target_user_id: decision.user_id.clone(),
                    old_outcome,
                    new_outcome: new_outcome.to_string(),
                    reason: reason.to_string(),
                    reviewer_notes: request
                        .reviewer_notes
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(String::from),
                    risk_level: request.risk_level,
                },
            )
            .await?;

        decision.outcome = new_outcome.to_string();
        decision.updated_at = updated_at;
        Ok(OverrideOutcome {
            decision,
            override_record,
        })
    }

    /// The override chain of a decision, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the decision does not exist.
    pub async fn override_chain(&self, decision_id: &str) -> Result<Vec<DecisionOverride>, GovernanceError> {
        if self.get_decision(decision_id).await?.is_none() {
            return Err(GovernanceError::not_found("decision", decision_id));
        }
        Ok(self.list_overrides(decision_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{officer, seed_decision, test_service};
    use pretty_assertions::assert_eq;
    use trust_core::enums::AuditStatus;
    use trust_core::errors::ErrorKind;

    fn request(decision_id: &str, new_outcome: &str, risk_level: RiskLevel) -> OverrideRequest {
        OverrideRequest {
            decision_id: decision_id.into(),
            new_outcome: new_outcome.into(),
            reason: "manual review passed".into(),
            risk_level,
            reviewer_notes: None,
        }
    }

    #[tokio::test]
    async fn override_updates_decision_and_records_chain() {
        let svc = test_service().await;
        let decision = seed_decision(&svc, "usr-1").await;

        let outcome = svc
            .override_decision(&officer(), request(&decision.id, "approved", RiskLevel::High))
            .await
            .unwrap();
        assert_eq!(outcome.decision.outcome, "approved");
        assert_eq!(outcome.override_record.old_outcome, "denied");
        assert_eq!(outcome.override_record.new_outcome, "approved");
        assert_eq!(outcome.override_record.requested_by, "usr-officer");
        assert_eq!(outcome.override_record.target_user_id, "usr-1");

        let stored = svc.get_decision(&decision.id).await.unwrap().unwrap();
        assert_eq!(stored, outcome.decision);
        assert_eq!(svc.override_chain(&decision.id).await.unwrap().len(), 1);

        let logs = svc
            .query_audit_logs(&AuditFilter {
                action: Some(AuditAction::DecisionOverride),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].risk_level, RiskLevel::High);
        assert_eq!(logs[0].details.as_ref().unwrap()["old_outcome"], "denied");
    }

    #[tokio::test]
    async fn same_outcome_is_rejected_without_writes() {
        let svc = test_service().await;
        let decision = seed_decision(&svc, "usr-1").await;
        let err = svc
            .override_decision(&officer(), request(&decision.id, "denied", RiskLevel::Low))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(svc.list_overrides(&decision.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_reason_and_anonymous_caller_are_rejected() {
        let svc = test_service().await;
        let decision = seed_decision(&svc, "usr-1").await;

        let mut blank = request(&decision.id, "approved", RiskLevel::Low);
        blank.reason = "   ".into();
        let err = svc.override_decision(&officer(), blank).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = svc
            .override_decision(&Caller::system(), request(&decision.id, "approved", RiskLevel::Low))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn unknown_decision_is_audited_as_failure() {
        let svc = test_service().await;
        let err = svc
            .override_decision(&officer(), request("dec-00000000", "approved", RiskLevel::Low))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let logs = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, AuditStatus::Failure);
        assert_eq!(logs[0].risk_level, RiskLevel::Medium);

        let err = svc.override_chain("dec-00000000").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
