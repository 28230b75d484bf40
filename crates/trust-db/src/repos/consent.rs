//! Consent repository. Every user gets one row per consent type, created
//! not granted on first access.

use trust_core::entities::Consent;
use trust_core::enums::ConsentType;
use trust_core::ids::PREFIX_CONSENT;

use crate::Transaction;
use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_bool, get_opt_string, get_u64, now_micros, parse_datetime, parse_enum,
    parse_optional_datetime,
};
use crate::service::TrustService;

fn row_to_consent(row: &libsql::Row) -> Result<Consent, DatabaseError> {
    Ok(Consent {
        id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        consent_type: parse_enum(&row.get::<String>(2)?)?,
        purpose_description: row.get::<String>(3)?,
        is_granted: get_bool(row, 4)?,
        granted_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        revoked_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

const SELECT_COLS: &str = "id, user_id, consent_type, purpose_description, is_granted, \
     granted_at, revoked_at, created_at, updated_at";

impl TrustService {
    /// Create the missing default consents of a user (all not granted).
    ///
    /// Must not be called while the caller holds a transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if an insert fails.
    pub async fn ensure_default_consents(&self, user_id: &str) -> Result<(), DatabaseError> {
        let existing = self.list_consents_for(user_id).await?;
        if existing.len() == ConsentType::ALL.len() {
            return Ok(());
        }

        let now = format_timestamp(&now_micros());
        let mut ids = Vec::with_capacity(ConsentType::ALL.len());
        for _ in ConsentType::ALL {
            ids.push(self.db().generate_id(PREFIX_CONSENT).await?);
        }

        let tx = self.db().begin().await?;
        for (consent_type, id) in ConsentType::ALL.into_iter().zip(ids) {
            let inserted = tx
                .execute(
                    "INSERT OR IGNORE INTO consents (id, user_id, consent_type, purpose_description,
                         is_granted, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
                    libsql::params![
                        id.as_str(),
                        user_id,
                        consent_type.as_str(),
                        consent_type.purpose_description(),
                        now.as_str()
                    ],
                )
                .await;
            if let Err(e) = inserted {
                tx.abandon().await;
                return Err(e);
            }
        }
        tx.commit().await
    }

    /// A user's consents in type order, without creating defaults.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_consents_for(&self, user_id: &str) -> Result<Vec<Consent>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM consents WHERE user_id = ?1 ORDER BY consent_type ASC"
        );
        let mut rows = self.db().conn().query(&sql, [user_id]).await?;
        let mut consents = Vec::new();
        while let Some(row) = rows.next().await? {
            consents.push(row_to_consent(&row)?);
        }
        Ok(consents)
    }

    /// Get a consent by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or row decoding fails.
    pub async fn get_consent(&self, id: &str) -> Result<Option<Consent>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM consents WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_consent(&row)?)),
            None => Ok(None),
        }
    }

    /// Grant or revoke a consent. Granting stamps `granted_at`; revoking
    /// stamps `revoked_at`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the consent does not exist.
    pub async fn set_consent(
        &self,
        tx: &Transaction<'_>,
        id: &str,
        granted: bool,
    ) -> Result<(), DatabaseError> {
        let now = format_timestamp(&now_micros());
        let sql = if granted {
            "UPDATE consents SET is_granted = 1, granted_at = ?1, updated_at = ?1 WHERE id = ?2"
        } else {
            "UPDATE consents SET is_granted = 0, revoked_at = ?1, updated_at = ?1 WHERE id = ?2"
        };
        let changed = tx.execute(sql, libsql::params![now.as_str(), id]).await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Whether the user currently grants `consent_type`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn consent_granted(
        &self,
        user_id: &str,
        consent_type: ConsentType,
    ) -> Result<bool, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT is_granted FROM consents WHERE user_id = ?1 AND consent_type = ?2",
                [user_id, consent_type.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => get_bool(&row, 0),
            None => Ok(false),
        }
    }

    /// Every consent, ordered by user then type (export).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn all_consents(&self) -> Result<Vec<Consent>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM consents ORDER BY user_id ASC, consent_type ASC");
        let mut rows = self.db().conn().query(&sql, ()).await?;
        let mut consents = Vec::new();
        while let Some(row) = rows.next().await? {
            consents.push(row_to_consent(&row)?);
        }
        Ok(consents)
    }

    /// Count granted consents, optionally for one user and granted since a
    /// point in time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_granted_consents(
        &self,
        user_id: Option<&str>,
        since: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM consents
                 WHERE is_granted = 1
                   AND (?1 IS NULL OR user_id = ?1)
                   AND (?2 IS NULL OR granted_at >= ?2)",
                libsql::params![user_id, since.as_ref().map(format_timestamp)],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_u64(&row, 0)
    }
}
