//! Explanation repository. One explanation per decision, enforced by the
//! UNIQUE constraint on `decision_id`.

use trust_core::entities::{Explanation, ExplanationData};
use trust_core::ids::PREFIX_EXPLANATION;

use crate::Transaction;
use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, now_micros, parse_datetime, parse_json};
use crate::service::TrustService;

fn row_to_explanation(row: &libsql::Row) -> Result<Explanation, DatabaseError> {
    Ok(Explanation {
        id: row.get::<String>(0)?,
        decision_id: row.get::<String>(1)?,
        feature_contributions: parse_json(&row.get::<String>(2)?)?,
        fairness_metrics: parse_json(&row.get::<String>(3)?)?,
        summary: row.get::<String>(4)?,
        method: row.get::<String>(5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

const SELECT_COLS: &str =
    "id, decision_id, feature_contributions, fairness_metrics, summary, method, created_at";

impl TrustService {
    /// Store the explanation for `decision_id` inside `tx`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails, including when the
    /// decision already has an explanation.
    pub async fn create_explanation(
        &self,
        tx: &Transaction<'_>,
        decision_id: &str,
        data: ExplanationData,
    ) -> Result<Explanation, DatabaseError> {
        let now = now_micros();
        let id = self.db().generate_id(PREFIX_EXPLANATION).await?;

        tx.execute(
            "INSERT INTO explanations (id, decision_id, feature_contributions, fairness_metrics, summary, method, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                id.as_str(),
                decision_id,
                serde_json::to_string(&data.feature_contributions)?,
                serde_json::to_string(&data.fairness_metrics)?,
                data.summary.as_str(),
                data.method.as_str(),
                format_timestamp(&now)
            ],
        )
        .await?;

        Ok(Explanation {
            id,
            decision_id: decision_id.to_string(),
            feature_contributions: data.feature_contributions,
            fairness_metrics: data.fairness_metrics,
            summary: data.summary,
            method: data.method,
            created_at: now,
        })
    }

    /// The stored explanation for a decision, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or row decoding fails.
    pub async fn get_explanation(&self, decision_id: &str) -> Result<Option<Explanation>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM explanations WHERE decision_id = ?1");
        let mut rows = self.db().conn().query(&sql, [decision_id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_explanation(&row)?)),
            None => Ok(None),
        }
    }

    /// Average `overall_accuracy` across stored explanations, optionally only
    /// those of one user's decisions.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn average_explanation_accuracy(
        &self,
        user_id: Option<&str>,
    ) -> Result<Option<f64>, DatabaseError> {
        let mut rows = match user_id {
            None => {
                self.db()
                    .conn()
                    .query(
                        "SELECT AVG(json_extract(fairness_metrics, '$.overall_accuracy')) FROM explanations",
                        (),
                    )
                    .await?
            }
            Some(user_id) => {
                self.db()
                    .conn()
                    .query(
                        "SELECT AVG(json_extract(e.fairness_metrics, '$.overall_accuracy'))
                         FROM explanations e JOIN decisions d ON d.id = e.decision_id
                         WHERE d.user_id = ?1",
                        [user_id],
                    )
                    .await?
            }
        };
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<Option<f64>>(0)?)
    }
}
