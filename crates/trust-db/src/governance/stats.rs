//! Dashboard statistics.

use chrono::{DateTime, Duration, Utc};
use trust_core::enums::Severity;
use trust_core::errors::GovernanceError;
use trust_core::responses::DashboardStats;

use crate::governance::fairness_score;
use crate::helpers::now_micros;
use crate::service::TrustService;

const HOURS_PER_DAY: usize = 24;

/// Whose numbers a dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsScope {
    System,
    User(String),
}

impl StatsScope {
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::System => None,
            Self::User(id) => Some(id),
        }
    }
}

impl TrustService {
    /// Decision, consent, and alert counters for the whole system or for one
    /// user, plus decisions per hour over the last day.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a query fails.
    pub async fn dashboard_stats(&self, scope: &StatsScope) -> Result<DashboardStats, GovernanceError> {
        let user = scope.user_id();
        let now = now_micros();
        let day_ago = now - Duration::hours(24);

        let times = self.decision_times_since(user, day_ago).await?;
        Ok(DashboardStats {
            user_id: user.map(String::from),
            total_decisions: self.count_decisions(user, None).await?,
            decisions_24h: u64::try_from(times.len()).unwrap_or(u64::MAX),
            granted_consents: self.count_granted_consents(user, None).await?,
            consents_24h: self.count_granted_consents(user, Some(day_ago)).await?,
            open_alerts: self.count_open_alerts(user, None).await?,
            critical_alerts: self.count_open_alerts(user, Some(Severity::Critical)).await?,
            fairness_score: fairness_score(self.average_explanation_accuracy(user).await?),
            hourly_decisions: hourly_buckets(&times, now),
            last_updated: now,
        })
    }
}

/// Count `times` into 24 one-hour buckets ending at `now`, oldest first.
/// Times outside the last 24 hours are ignored.
fn hourly_buckets(times: &[DateTime<Utc>], now: DateTime<Utc>) -> Vec<u64> {
    let mut buckets = vec![0_u64; HOURS_PER_DAY];
    for t in times {
        let Ok(hours_ago) = usize::try_from((now - *t).num_hours()) else {
            continue;
        };
        if hours_ago < HOURS_PER_DAY {
            buckets[HOURS_PER_DAY - 1 - hours_ago] += 1;
        }
    }
    buckets
}
