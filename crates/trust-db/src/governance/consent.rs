//! Consent listing and grant/revoke.

use trust_core::audit_detail::ConsentChangedDetail;
use trust_core::entities::Consent;
use trust_core::enums::{AuditAction, ResourceType, RiskLevel};
use trust_core::errors::GovernanceError;
use trust_core::identity::Caller;

use crate::governance::audits_failure;
use crate::repos::audit::AuditRecord;
use crate::service::TrustService;

impl TrustService {
    /// A user's consents, creating the four defaults (not granted) first.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the store fails.
    pub async fn list_consents(&self, user_id: &str) -> Result<Vec<Consent>, GovernanceError> {
        self.ensure_default_consents(user_id).await?;
        Ok(self.list_consents_for(user_id).await?)
    }

    /// Grant or revoke one of a user's consents.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the consent does not exist or belongs to
    /// another user.
    pub async fn update_consent(
        &self,
        caller: &Caller,
        user_id: &str,
        consent_id: &str,
        granted: bool,
    ) -> Result<Consent, GovernanceError> {
        let audit = AuditRecord::new(AuditAction::ConsentUpdate, caller)
            .resource(ResourceType::Consent, consent_id);

        let changed = self.set_owned_consent(user_id, consent_id, granted).await;
        match changed {
            Ok(consent) => {
                let risk = if granted { RiskLevel::Low } else { RiskLevel::Medium };
                tracing::debug!(user_id, consent_id, granted, "consent: updated");
                self.record_audit(audit.risk(risk).details(&ConsentChangedDetail {
                    consent_type: consent.consent_type,
                    granted,
                }))
                .await;
                Ok(consent)
            }
            Err(err) => {
                if audits_failure(&err) {
                    self.record_audit(audit.failure(&err)).await;
                }
                Err(err)
            }
        }
    }

    async fn set_owned_consent(
        &self,
        user_id: &str,
        consent_id: &str,
        granted: bool,
    ) -> Result<Consent, GovernanceError> {
        let owned = self
            .get_consent(consent_id)
            .await?
            .filter(|c| c.user_id == user_id);
        if owned.is_none() {
            return Err(GovernanceError::not_found("consent", consent_id));
        }

        let tx = self.db().begin().await?;
        if let Err(e) = self.set_consent(&tx, consent_id, granted).await {
            tx.abandon().await;
            return Err(e.into());
        }
        tx.commit().await?;

        self.get_consent(consent_id)
            .await?
            .ok_or_else(|| GovernanceError::not_found("consent", consent_id))
    }
}
