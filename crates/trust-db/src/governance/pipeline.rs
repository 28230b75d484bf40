//! Decision pipeline: engine -> persist -> explain -> screen -> audit.
//!
//! The decision row, its explanation, and its alerts are written in one
//! transaction. Explanation and screening each run under a savepoint and
//! degrade to a warning on failure; the decision is kept either way.

use std::fmt;

use chrono::{Duration, NaiveTime, Utc};
use serde_json::Value;
use trust_core::audit_detail::DecisionMadeDetail;
use trust_core::entities::{BiasAlert, Decision, Explanation, ExplanationData};
use trust_core::enums::{AuditAction, AuditStatus, DecisionType, ResourceType, RiskLevel, Severity};
use trust_core::errors::GovernanceError;
use trust_core::identity::Caller;
use trust_core::responses::{DecisionOutcome, NotificationIntent};
use trust_engine::{DecisionResult, EngineError, OutcomeHistory};

use crate::Transaction;
use crate::error::DatabaseError;
use crate::governance::audits_failure;
use crate::repos::audit::AuditRecord;
use crate::repos::decision::NewDecision;
use crate::service::TrustService;

/// A request to run one automated decision.
#[derive(Debug, Clone)]
pub struct SimulateRequest {
    /// Decision type name; the `fraud_check` and `risk_profile` aliases are accepted.
    pub decision_type: String,
    /// Whom the decision is about. Defaults to the calling actor.
    pub subject_user_id: Option<String>,
    pub input: Value,
}

/// Why a degradable step did not complete.
#[derive(Debug)]
enum StepError {
    Engine(EngineError),
    Storage(DatabaseError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "{e}"),
            Self::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl From<DatabaseError> for StepError {
    fn from(err: DatabaseError) -> Self {
        Self::Storage(err)
    }
}

/// What the pipeline transaction committed.
struct Persisted {
    decision: Decision,
    explanation: Option<Explanation>,
    bias_alerts: Vec<BiasAlert>,
    warnings: Vec<String>,
}

impl TrustService {
    /// Run a decision end to end and return it with its explanation, any
    /// bias alerts, and the notification intents for its subject.
    ///
    /// # Errors
    ///
    /// - `Validation` if there is no subject or the payload is invalid.
    /// - `UnsupportedDecisionType` for an unknown type.
    /// - `Permission` if consent enforcement is on and the subject has not
    ///   granted the consent the type requires.
    /// - `Internal` if the decision cannot be stored.
    pub async fn simulate_decision(
        &self,
        caller: &Caller,
        request: SimulateRequest,
    ) -> Result<DecisionOutcome, GovernanceError> {
        let subject = request
            .subject_user_id
            .as_deref()
            .or_else(|| caller.actor_id())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| GovernanceError::Validation("a decision needs a subject user".into()))?;

        let audit = AuditRecord::new(AuditAction::AiDecision, caller);

        if let Err(err) = self.check_consent(&subject, &request.decision_type).await {
            if audits_failure(&err) {
                self.record_audit(
                    audit
                        .resource(ResourceType::User, subject.as_str())
                        .risk(RiskLevel::Medium)
                        .failure(&err),
                )
                .await;
            }
            return Err(err);
        }

        let result = match self
            .engine()
            .make_decision(&request.decision_type, &request.input, &subject)
        {
            Ok(result) => result,
            Err(e) => {
                let err = GovernanceError::from(e);
                if audits_failure(&err) {
                    self.record_audit(
                        audit
                            .resource(ResourceType::User, subject.as_str())
                            .failure(&err),
                    )
                    .await;
                }
                return Err(err);
            }
        };

        let persisted = match self.persist_decision(&subject, request.input, result).await {
            Ok(persisted) => persisted,
            Err(e) => {
                let err = GovernanceError::from(e);
                self.record_audit(
                    audit
                        .resource(ResourceType::User, subject.as_str())
                        .risk(RiskLevel::Medium)
                        .failure(&err),
                )
                .await;
                return Err(err);
            }
        };
        let Persisted {
            decision,
            explanation,
            bias_alerts,
            mut warnings,
        } = persisted;

        let (status, risk) = if warnings.is_empty() {
            (AuditStatus::Success, RiskLevel::Low)
        } else {
            (AuditStatus::Failure, RiskLevel::Medium)
        };
        self.record_audit(
            audit
                .resource(ResourceType::Decision, decision.id.as_str())
                .status(status)
                .risk(risk)
                .details(&DecisionMadeDetail {
                    decision_type: decision.decision_type,
                    outcome: decision.outcome.clone(),
                    confidence: decision.confidence_score,
                    model_name: decision.model_name.clone(),
                    model_version: decision.model_version.clone(),
                    alerts_raised: u32::try_from(bias_alerts.len()).unwrap_or(u32::MAX),
                    warnings: warnings.clone(),
                }),
        )
        .await;

        let notifications = match self.notification_intents(&decision).await {
            Ok(intents) => intents,
            Err(e) => {
                tracing::warn!(decision_id = %decision.id, error = %e, "pipeline: notification preferences unavailable");
                warnings.push("notification preferences unavailable".to_string());
                Vec::new()
            }
        };

        tracing::debug!(
            decision_id = %decision.id,
            outcome = %decision.outcome,
            alerts = bias_alerts.len(),
            notifications = notifications.len(),
            "pipeline: decision complete"
        );

        Ok(DecisionOutcome {
            decision,
            explanation,
            bias_alerts,
            notifications,
            warnings,
        })
    }

    async fn check_consent(&self, subject: &str, decision_type: &str) -> Result<(), GovernanceError> {
        if !self.config().governance.require_consent {
            return Ok(());
        }
        // Unknown types fall through to the engine, which reports them.
        let Ok(parsed) = decision_type.parse::<DecisionType>() else {
            return Ok(());
        };
        let required = parsed.required_consent();
        if self.consent_granted(subject, required).await? {
            Ok(())
        } else {
            Err(GovernanceError::Permission(format!(
                "user {subject} has not granted {} consent",
                required.as_str()
            )))
        }
    }

    async fn persist_decision(
        &self,
        subject: &str,
        input: Value,
        result: DecisionResult,
    ) -> Result<Persisted, DatabaseError> {
        let tx = self.db().begin().await?;
        let decision = match self
            .create_decision(&tx, NewDecision::from_result(subject, input, result))
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                tx.abandon().await;
                return Err(e);
            }
        };

        let mut warnings = Vec::new();

        let explanation = match self.eager_explanation(&tx, &decision).await {
            Ok(explanation) => Some(explanation),
            Err(e) => {
                tracing::warn!(decision_id = %decision.id, error = %e, "pipeline: explanation failed");
                warnings.push(format!("explanation unavailable: {e}"));
                None
            }
        };

        let data = explanation.as_ref().map(Explanation::data);
        let bias_alerts = match self.screen_new_decision(&tx, &decision, data.as_ref()).await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::warn!(decision_id = %decision.id, error = %e, "pipeline: screening failed");
                warnings.push(format!("bias screening unavailable: {e}"));
                Vec::new()
            }
        };

        tx.commit().await?;
        Ok(Persisted {
            decision,
            explanation,
            bias_alerts,
            warnings,
        })
    }

    async fn eager_explanation(
        &self,
        tx: &Transaction<'_>,
        decision: &Decision,
    ) -> Result<Explanation, StepError> {
        let data = self.explainer().explain(decision).map_err(StepError::Engine)?;
        let savepoint = tx.savepoint("explanation").await?;
        match self.create_explanation(tx, &decision.id, data).await {
            Ok(explanation) => {
                savepoint.release().await?;
                Ok(explanation)
            }
            Err(e) => {
                savepoint.rollback().await?;
                Err(StepError::Storage(e))
            }
        }
    }

    async fn screen_new_decision(
        &self,
        tx: &Transaction<'_>,
        decision: &Decision,
        explanation: Option<&ExplanationData>,
    ) -> Result<Vec<BiasAlert>, StepError> {
        let bias = &self.config().bias;
        let mut recent = self
            .recent_decisions_of_type(decision.decision_type, bias.history_window)
            .await?;
        if !recent.iter().any(|d| d.id == decision.id) {
            recent.push(decision.clone());
        }
        let history =
            OutcomeHistory::from_decisions(decision.decision_type, &bias.protected_attributes, &recent);
        let drafts = self
            .screener()
            .screen(decision, explanation, &history)
            .map_err(StepError::Engine)?;
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let savepoint = tx.savepoint("screening").await?;
        let mut alerts = Vec::with_capacity(drafts.len());
        for draft in drafts {
            match self.create_bias_alert(tx, draft).await {
                Ok(alert) => alerts.push(alert),
                Err(e) => {
                    savepoint.rollback().await?;
                    return Err(StepError::Storage(e));
                }
            }
        }
        savepoint.release().await?;
        Ok(alerts)
    }

    /// Channels on which the decision's subject may be told about it right
    /// now. Favorable outcomes are low severity, others medium.
    async fn notification_intents(
        &self,
        decision: &Decision,
    ) -> Result<Vec<NotificationIntent>, DatabaseError> {
        let pref = self
            .get_or_create_notification_preference(&decision.user_id)
            .await?;
        let severity = if decision.is_favorable() {
            Severity::Low
        } else {
            Severity::Medium
        };
        let at = local_time_now(self.config().governance.local_utc_offset_minutes);
        let message = format!(
            "Your {} decision is ready: {}",
            decision.decision_type, decision.outcome
        );
        Ok(pref
            .deliverable_channels(severity, at)
            .into_iter()
            .map(|channel| NotificationIntent {
                user_id: decision.user_id.clone(),
                decision_id: decision.id.clone(),
                channel,
                severity,
                message: message.clone(),
            })
            .collect())
    }
}

/// Wall-clock time of day at a fixed UTC offset.
fn local_time_now(offset_minutes: i32) -> NaiveTime {
    (Utc::now() + Duration::minutes(i64::from(offset_minutes))).time()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{
        consent_enforcing_service, customer, loan_input, test_service, unexplainable_service,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use trust_core::enums::{Channel, ConsentType};
    use trust_core::errors::ErrorKind;

    fn loan_request(input: Value) -> SimulateRequest {
        SimulateRequest {
            decision_type: "loan_approval".into(),
            subject_user_id: None,
            input,
        }
    }

    #[tokio::test]
    async fn denied_loan_is_explained_and_audited() {
        let svc = test_service().await;
        let outcome = svc
            .simulate_decision(&customer("usr-1"), loan_request(loan_input(20_000, 100_000, 580)))
            .await
            .unwrap();

        assert_eq!(outcome.decision.outcome, "denied");
        assert_eq!(outcome.decision.user_id, "usr-1");
        assert!(outcome.warnings.is_empty());
        let explanation = outcome.explanation.unwrap();
        assert!(explanation.metric("overall_accuracy").is_some());
        assert_eq!(
            svc.get_explanation(&outcome.decision.id).await.unwrap(),
            Some(explanation)
        );

        let logs = svc
            .query_audit_logs(&AuditFilter {
                action: Some(AuditAction::AiDecision),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, AuditStatus::Success);
        assert_eq!(logs[0].resource_id.as_deref(), Some(outcome.decision.id.as_str()));
        assert_eq!(logs[0].details.as_ref().unwrap()["outcome"], "denied");
    }

    #[tokio::test]
    async fn failed_explanation_keeps_decision_and_audits_failure() {
        let svc = unexplainable_service().await;
        let outcome = svc
            .simulate_decision(&customer("usr-1"), loan_request(loan_input(20_000, 100_000, 580)))
            .await
            .unwrap();

        assert_eq!(outcome.decision.outcome, "denied");
        assert!(outcome.explanation.is_none());
        assert_eq!(outcome.warnings.len(), 1, "{:?}", outcome.warnings);
        assert!(outcome.warnings[0].starts_with("explanation unavailable"));

        let stored = svc.get_decision(&outcome.decision.id).await.unwrap();
        assert_eq!(stored.as_ref(), Some(&outcome.decision));
        assert_eq!(svc.get_explanation(&outcome.decision.id).await.unwrap(), None);

        let logs = svc
            .query_audit_logs(&AuditFilter {
                action: Some(AuditAction::AiDecision),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, AuditStatus::Failure);
        assert_eq!(logs[0].risk_level, RiskLevel::Medium);
        assert_eq!(logs[0].resource_id.as_deref(), Some(outcome.decision.id.as_str()));
        assert_eq!(
            logs[0].details.as_ref().unwrap()["warnings"][0],
            outcome.warnings[0].as_str()
        );
    }

    #[tokio::test]
    async fn default_preferences_yield_email_intent() {
        let svc = test_service().await;
        let outcome = svc
            .simulate_decision(&customer("usr-1"), loan_request(loan_input(20_000, 100_000, 580)))
            .await
            .unwrap();
        assert_eq!(outcome.notifications.len(), 1);
        let intent = &outcome.notifications[0];
        assert_eq!(intent.channel, Channel::Email);
        assert_eq!(intent.severity, Severity::Medium);
        assert_eq!(intent.message, "Your loan_approval decision is ready: denied");
    }

    #[tokio::test]
    async fn explicit_subject_overrides_actor() {
        let svc = test_service().await;
        let request = SimulateRequest {
            subject_user_id: Some("usr-subject".into()),
            ..loan_request(loan_input(90_000, 10_000, 800))
        };
        let outcome = svc.simulate_decision(&customer("usr-agent"), request).await.unwrap();
        assert_eq!(outcome.decision.user_id, "usr-subject");
        assert_eq!(outcome.decision.outcome, "approved");
    }

    #[tokio::test]
    async fn anonymous_caller_without_subject_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .simulate_decision(&Caller::system(), loan_request(loan_input(1, 1, 700)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn invalid_payload_writes_nothing() {
        let svc = test_service().await;
        let err = svc
            .simulate_decision(&customer("usr-1"), loan_request(json!({"income": 10})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(svc.count_decisions(None, None).await.unwrap(), 0);
        assert!(svc.query_audit_logs(&AuditFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsupported_type_is_audited_as_failure() {
        let svc = test_service().await;
        let request = SimulateRequest {
            decision_type: "mortgage".into(),
            subject_user_id: None,
            input: json!({}),
        };
        let err = svc.simulate_decision(&customer("usr-1"), request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedDecisionType);

        let logs = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, AuditStatus::Failure);
        assert_eq!(logs[0].details.as_ref().unwrap()["error_kind"], "unsupported_decision_type");
    }

    #[tokio::test]
    async fn missing_consent_is_refused_when_enforced() {
        let svc = consent_enforcing_service().await;
        svc.ensure_default_consents("usr-1").await.unwrap();

        let err = svc
            .simulate_decision(&customer("usr-1"), loan_request(loan_input(20_000, 100_000, 580)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(svc.count_decisions(None, None).await.unwrap(), 0);

        let logs = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, AuditStatus::Failure);
        assert_eq!(logs[0].risk_level, RiskLevel::Medium);

        let consent = svc
            .list_consents_for("usr-1")
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.consent_type == ConsentType::CreditScoring)
            .unwrap();
        let tx = svc.db().begin().await.unwrap();
        svc.set_consent(&tx, &consent.id, true).await.unwrap();
        tx.commit().await.unwrap();

        svc.simulate_decision(&customer("usr-1"), loan_request(loan_input(20_000, 100_000, 580)))
            .await
            .unwrap();
        assert_eq!(svc.count_decisions(Some("usr-1"), None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn risk_profile_accuracy_raises_alert() {
        let svc = test_service().await;
        let request = SimulateRequest {
            decision_type: "risk_profile".into(),
            subject_user_id: None,
            input: json!({"age": 30, "investment_horizon_years": 10, "loss_tolerance": 0.6}),
        };
        let outcome = svc.simulate_decision(&customer("usr-1"), request).await.unwrap();
        assert_eq!(outcome.decision.decision_type, DecisionType::RiskProfiling);
        assert!(
            outcome
                .bias_alerts
                .iter()
                .any(|a| a.metric_name == "overall_accuracy"),
            "{:?}",
            outcome.bias_alerts
        );
        assert!(outcome.bias_alerts.iter().all(|a| a.decision_id == outcome.decision.id));
    }
}
