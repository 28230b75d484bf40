//! Notification preference repository. One row per user, created with
//! defaults on first access.

use trust_core::entities::NotificationPreference;
use trust_core::ids::PREFIX_NOTIFICATION_PREF;

use crate::Transaction;
use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_bool, get_opt_string, now_micros, parse_datetime, parse_json,
};
use crate::service::TrustService;

fn row_to_preference(row: &libsql::Row) -> Result<NotificationPreference, DatabaseError> {
    Ok(NotificationPreference {
        id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        email_enabled: get_bool(row, 2)?,
        sms_enabled: get_bool(row, 3)?,
        push_enabled: get_bool(row, 4)?,
        weekly_summary_enabled: get_bool(row, 5)?,
        critical_alerts_only: get_bool(row, 6)?,
        quiet_hours_start: get_opt_string(row, 7)?,
        quiet_hours_end: get_opt_string(row, 8)?,
        preferred_channels: parse_json(&row.get::<String>(9)?)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

const SELECT_COLS: &str = "id, user_id, email_enabled, sms_enabled, push_enabled, \
     weekly_summary_enabled, critical_alerts_only, quiet_hours_start, quiet_hours_end, \
     preferred_channels, created_at, updated_at";

impl TrustService {
    /// The stored preferences of a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or row decoding fails.
    pub async fn get_notification_preference(
        &self,
        user_id: &str,
    ) -> Result<Option<NotificationPreference>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM notification_preferences WHERE user_id = ?1");
        let mut rows = self.db().conn().query(&sql, [user_id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_preference(&row)?)),
            None => Ok(None),
        }
    }

    /// The user's preferences, inserting the defaults first if none exist.
    ///
    /// Must not be called while the caller holds a transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the insert or lookup fails.
    pub async fn get_or_create_notification_preference(
        &self,
        user_id: &str,
    ) -> Result<NotificationPreference, DatabaseError> {
        if let Some(existing) = self.get_notification_preference(user_id).await? {
            return Ok(existing);
        }

        let id = self.db().generate_id(PREFIX_NOTIFICATION_PREF).await?;
        let defaults = NotificationPreference::defaults(id, user_id, now_micros());
        let tx = self.db().begin().await?;
        // A concurrent first access may have inserted meanwhile; keep theirs.
        let inserted = self.insert_preference_if_absent(&tx, &defaults).await;
        match inserted {
            Ok(()) => tx.commit().await?,
            Err(e) => {
                tx.abandon().await;
                return Err(e);
            }
        }

        self.get_notification_preference(user_id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    async fn insert_preference_if_absent(
        &self,
        tx: &Transaction<'_>,
        pref: &NotificationPreference,
    ) -> Result<(), DatabaseError> {
        tx.execute(
            "INSERT OR IGNORE INTO notification_preferences (id, user_id, email_enabled, sms_enabled,
                 push_enabled, weekly_summary_enabled, critical_alerts_only, quiet_hours_start,
                 quiet_hours_end, preferred_channels, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            libsql::params![
                pref.id.as_str(),
                pref.user_id.as_str(),
                i64::from(pref.email_enabled),
                i64::from(pref.sms_enabled),
                i64::from(pref.push_enabled),
                i64::from(pref.weekly_summary_enabled),
                i64::from(pref.critical_alerts_only),
                pref.quiet_hours_start.as_deref(),
                pref.quiet_hours_end.as_deref(),
                serde_json::to_string(&pref.preferred_channels)?,
                format_timestamp(&pref.created_at),
                format_timestamp(&pref.updated_at)
            ],
        )
        .await?;
        Ok(())
    }

    /// Overwrite every field of the user's stored preferences.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the user has no stored row.
    pub async fn save_notification_preference(
        &self,
        tx: &Transaction<'_>,
        pref: &NotificationPreference,
    ) -> Result<(), DatabaseError> {
        let changed = tx
            .execute(
                "UPDATE notification_preferences
                 SET email_enabled = ?1, sms_enabled = ?2, push_enabled = ?3,
                     weekly_summary_enabled = ?4, critical_alerts_only = ?5,
                     quiet_hours_start = ?6, quiet_hours_end = ?7, preferred_channels = ?8,
                     updated_at = ?9
                 WHERE user_id = ?10",
                libsql::params![
                    i64::from(pref.email_enabled),
                    i64::from(pref.sms_enabled),
                    i64::from(pref.push_enabled),
                    i64::from(pref.weekly_summary_enabled),
                    i64::from(pref.critical_alerts_only),
                    pref.quiet_hours_start.as_deref(),
                    pref.quiet_hours_end.as_deref(),
                    serde_json::to_string(&pref.preferred_channels)?,
                    format_timestamp(&pref.updated_at),
                    pref.user_id.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;
    use trust_core::enums::Channel;

    #[tokio::test]
    async fn defaults_created_once() {
        let svc = test_service().await;
        assert!(svc.get_notification_preference("usr-1").await.unwrap().is_none());

        let first = svc.get_or_create_notification_preference("usr-1").await.unwrap();
        assert!(first.email_enabled && first.weekly_summary_enabled);
        assert!(!first.sms_enabled && !first.push_enabled && !first.critical_alerts_only);
        assert_eq!(first.preferred_channels, vec![Channel::Email]);

        let second = svc.get_or_create_notification_preference("usr-1").await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn save_overwrites_fields() {
        let svc = test_service().await;
        let mut pref = svc.get_or_create_notification_preference("usr-1").await.unwrap();
        pref.sms_enabled = true;
        pref.quiet_hours_start = Some("22:00".into());
        pref.quiet_hours_end = Some("07:00".into());
        pref.preferred_channels = vec![Channel::Sms, Channel::Email];
        pref.updated_at = now_micros();

        let tx = svc.db().begin().await.unwrap();
        svc.save_notification_preference(&tx, &pref).await.unwrap();
        tx.commit().await.unwrap();

        let stored = svc.get_notification_preference("usr-1").await.unwrap().unwrap();
        assert_eq!(stored, pref);
    }
}
