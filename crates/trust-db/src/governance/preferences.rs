//! Notification preference resolution and partial updates.

use trust_core::audit_detail::PreferencesUpdatedDetail;
use trust_core::entities::NotificationPreference;
use trust_core::enums::{AuditAction, ResourceType};
use trust_core::errors::GovernanceError;
use trust_core::identity::Caller;

use crate::Transaction;
use crate::error::DatabaseError;
use crate::helpers::now_micros;
use crate::repos::audit::AuditRecord;
use crate::service::TrustService;
use crate::updates::NotificationPreferenceUpdate;

impl TrustService {
    /// A user's preferences, created with defaults on first access.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the store fails.
    pub async fn resolve_notification_preferences(
        &self,
        user_id: &str,
    ) -> Result<NotificationPreference, GovernanceError> {
        Ok(self.get_or_create_notification_preference(user_id).await?)
    }

    /// Apply the present fields of `update` to a user's preferences.
    /// Concurrent updates do not merge; the last writer wins.
    ///
    /// An empty update returns the current preferences without writing.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the store fails.
    pub async fn update_notification_preferences(
        &self,
        caller: &Caller,
        user_id: &str,
        update: &NotificationPreferenceUpdate,
    ) -> Result<NotificationPreference, GovernanceError> {
        let current = self.get_or_create_notification_preference(user_id).await?;
        if update.is_empty() {
            return Ok(current);
        }

        let audit = AuditRecord::new(AuditAction::NotificationPreferencesUpdate, caller)
            .resource(ResourceType::NotificationPreference, current.id.as_str());

        let tx = self.db().begin().await?;
        let saved = match self.apply_preference_update(&tx, current, update).await {
            Ok(pref) => tx.commit().await.map(|()| pref),
            Err(e) => {
                tx.abandon().await;
                Err(e)
            }
        };
        let pref = match saved {
            Ok(pref) => pref,
            Err(e) => {
                let err = GovernanceError::from(e);
                self.record_audit(audit.failure(&err)).await;
                return Err(err);
            }
        };

        let updated_fields = update.updated_fields();
        tracing::debug!(user_id, fields = ?updated_fields, "preferences: updated");
        self.record_audit(audit.details(&PreferencesUpdatedDetail { updated_fields }))
            .await;
        Ok(pref)
    }

    async fn apply_preference_update(
        &self,
        tx: &Transaction<'_>,
        fallback: NotificationPreference,
        update: &NotificationPreferenceUpdate,
    ) -> Result<NotificationPreference, DatabaseError> {
        // Re-read under the write gate so the update lands on the latest row.
        let mut pref = self
            .get_notification_preference(&fallback.user_id)
            .await?
            .unwrap_or(fallback);
        update.apply_to(&mut pref);
        pref.updated_at = now_micros();
        self.save_notification_preference(tx, &pref).await?;
        Ok(pref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{customer, test_service};
    use crate::updates::NotificationPreferenceUpdateBuilder;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use trust_core::enums::Channel;

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let svc = test_service().await;
        let update = NotificationPreferenceUpdate::from_payload(&json!({
            "smsEnabled": "on",
            "preferredChannels": ["sms", "email"]
        }))
        .unwrap();

        let pref = svc
            .update_notification_preferences(&customer("usr-1"), "usr-1", &update)
            .await
            .unwrap();
        assert!(pref.sms_enabled);
        assert!(pref.email_enabled);
        assert!(pref.weekly_summary_enabled);
        assert_eq!(pref.preferred_channels, vec![Channel::Sms, Channel::Email]);
        assert_eq!(svc.resolve_notification_preferences("usr-1").await.unwrap(), pref);

        let logs = svc
            .query_audit_logs(&AuditFilter {
                action: Some(AuditAction::NotificationPreferencesUpdate),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(
            logs[0].details.as_ref().unwrap()["updated_fields"],
            json!(["smsEnabled", "preferredChannels"])
        );
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let svc = test_service().await;
        let caller = customer("usr-1");
        let off = NotificationPreferenceUpdateBuilder::new().email_enabled(false).build();
        let on = NotificationPreferenceUpdateBuilder::new().email_enabled(true).build();
        svc.update_notification_preferences(&caller, "usr-1", &off).await.unwrap();
        let pref = svc.update_notification_preferences(&caller, "usr-1", &on).await.unwrap();
        assert!(pref.email_enabled);
    }

    #[tokio::test]
    async fn empty_update_is_not_audited() {
        let svc = test_service().await;
        let pref = svc
            .update_notification_preferences(
                &customer("usr-1"),
                "usr-1",
                &NotificationPreferenceUpdate::default(),
            )
            .await
            .unwrap();
        assert!(pref.email_enabled);
        assert!(svc.query_audit_logs(&AuditFilter::default()).await.unwrap().is_empty());
    }
}
