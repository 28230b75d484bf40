//! Lazy explanation: generate on first request, return the stored one after.

use trust_core::audit_detail::ExplanationGeneratedDetail;
use trust_core::entities::{Decision, Explanation, ExplanationData};
use trust_core::enums::{AuditAction, ResourceType};
use trust_core::errors::GovernanceError;
use trust_core::identity::Caller;

use crate::Transaction;
use crate::error::DatabaseError;
use crate::governance::audits_failure;
use crate::repos::audit::AuditRecord;
use crate::service::TrustService;

impl TrustService {
    /// The explanation of a decision, generated and stored if missing.
    ///
    /// Repeated calls return the same stored explanation. Generation is
    /// audited once, as `explanation_generated`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the decision does not exist.
    /// - `Internal` if generation or storage fails; the next call retries.
    pub async fn explain_decision(
        &self,
        caller: &Caller,
        decision_id: &str,
    ) -> Result<Explanation, GovernanceError> {
        let decision = self
            .get_decision(decision_id)
            .await?
            .ok_or_else(|| GovernanceError::not_found("decision", decision_id))?;
        if let Some(existing) = self.get_explanation(decision_id).await? {
            return Ok(existing);
        }

        let audit = AuditRecord::new(AuditAction::ExplanationGenerated, caller)
            .resource(ResourceType::Decision, decision_id);

        let data = match self.explainer().explain(&decision) {
            Ok(data) => data,
            Err(e) => {
                let err = GovernanceError::from(e);
                if audits_failure(&err) {
                    self.record_audit(audit.failure(&err)).await;
                }
                return Err(err);
            }
        };
        let method = data.method.clone();

        let (explanation, created) = match self.store_explanation_once(&decision, data).await {
            Ok(stored) => stored,
            Err(e) => {
                let err = GovernanceError::from(e);
                self.record_audit(audit.failure(&err)).await;
                return Err(err);
            }
        };

        if created {
            tracing::debug!(decision_id, explanation_id = %explanation.id, "explain: generated lazily");
            self.record_audit(
                audit
                    .resource(ResourceType::Explanation, explanation.id.as_str())
                    .details(&ExplanationGeneratedDetail { method, lazy: true }),
            )
            .await;
        }
        Ok(explanation)
    }

    /// Insert unless a concurrent request stored one first. Returns the
    /// authoritative explanation and whether this call created it.
    async fn store_explanation_once(
        &self,
        decision: &Decision,
        data: ExplanationData,
    ) -> Result<(Explanation, bool), DatabaseError> {
        let tx = self.db().begin().await?;
        match self.insert_if_unexplained(&tx, decision, data).await {
            Ok(stored) => {
                tx.commit().await?;
                Ok(stored)
            }
            Err(e) => {
                tx.abandon().await;
                Err(e)
            }
        }
    }

    async fn insert_if_unexplained(
        &self,
        tx: &Transaction<'_>,
        decision: &Decision,
        data: ExplanationData,
    ) -> Result<(Explanation, bool), DatabaseError> {
        if let Some(existing) = self.get_explanation(&decision.id).await? {
            return Ok((existing, false));
        }
        let explanation = self.create_explanation(tx, &decision.id, data).await?;
        Ok((explanation, true))
    }
}
