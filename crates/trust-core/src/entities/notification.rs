use chrono::{DateTime, NaiveTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Channel, Severity};

/// Format of quiet-hour boundaries.
pub const QUIET_HOURS_FORMAT: &str = "%H:%M";

/// Per-user notification settings. One row per user, created with defaults on
/// first access.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NotificationPreference {
    pub id: String,
    pub user_id: String,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub weekly_summary_enabled: bool,
    pub critical_alerts_only: bool,
    /// `HH:MM`, local time.
    pub quiet_hours_start: Option<String>,
    /// `HH:MM`, local time.
    pub quiet_hours_end: Option<String>,
    pub preferred_channels: Vec<Channel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    /// Defaults for a user with nothing stored: email and weekly summary on,
    /// everything else off, no quiet hours.
    pub fn defaults(id: impl Into<String>, user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            email_enabled: true,
            sms_enabled: false,
            push_enabled: false,
            weekly_summary_enabled: true,
            critical_alerts_only: false,
            quiet_hours_start: None,
            quiet_hours_end: None,
            preferred_channels: vec![Channel::Email],
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email_enabled,
            Channel::Sms => self.sms_enabled,
            Channel::Push => self.push_enabled,
        }
    }

    /// Whether `at` falls inside the quiet-hours window. The window is
    /// half-open and wraps midnight when `start > end`. Missing or malformed
    /// bounds mean no quiet hours.
    #[must_use]
    pub fn in_quiet_hours(&self, at: NaiveTime) -> bool {
        let (Some(start), Some(end)) = (
            parse_quiet_time(self.quiet_hours_start.as_deref()),
            parse_quiet_time(self.quiet_hours_end.as_deref()),
        ) else {
            return false;
        };
        if start <= end {
            start <= at && at < end
        } else {
            at >= start || at < end
        }
    }

    /// Whether a notification of `severity` may go out on `channel` at local
    /// time `at`.
    #[must_use]
    pub fn should_notify(&self, channel: Channel, severity: Severity, at: NaiveTime) -> bool {
        if !self.channel_enabled(channel) {
            return false;
        }
        if self.critical_alerts_only && severity != Severity::Critical {
            return false;
        }
        !self.in_quiet_hours(at)
    }

    /// Preferred channels that would deliver a notification right now, in
    /// preference order.
    #[must_use]
    pub fn deliverable_channels(&self, severity: Severity, at: NaiveTime) -> Vec<Channel> {
        self.preferred_channels
            .iter()
            .copied()
            .filter(|c| self.should_notify(*c, severity, at))
            .collect()
    }
}

fn parse_quiet_time(value: Option<&str>) -> Option<NaiveTime> {
    value.and_then(|v| NaiveTime::parse_from_str(v.trim(), QUIET_HOURS_FORMAT).ok())
}
