//! Notification preference update builder.
//!
//! One optional field per preference; `apply_to` assigns only the present
//! ones. `from_payload` parses the camelCase boundary payload.

use std::str::FromStr;

use chrono::NaiveTime;
use serde::Serialize;
use serde_json::Value;
use trust_core::entities::NotificationPreference;
use trust_core::entities::notification::QUIET_HOURS_FORMAT;
use trust_core::enums::Channel;
use trust_core::errors::GovernanceError;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct NotificationPreferenceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_summary_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_alerts_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet_hours_start: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet_hours_end: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_channels: Option<Vec<Channel>>,
}

impl NotificationPreferenceUpdate {
    /// Parse a boundary payload such as
    /// `{"emailEnabled": "yes", "quietHours": {"start": "22:00", "end": "07:00"}}`.
    ///
    /// Unknown keys are ignored. A `quietHours` value of `null` clears the window.
    ///
    /// # Errors
    ///
    /// Returns `GovernanceError::Validation` when the payload is not an
    /// object, quiet hours are not `HH:MM`, or a channel is unknown.
    pub fn from_payload(payload: &Value) -> Result<Self, GovernanceError> {
        let obj = payload.as_object().ok_or_else(|| {
            GovernanceError::Validation("preferences payload must be an object".into())
        })?;
        let flag = |key: &str| obj.get(key).map(loose_bool);

        let mut update = Self {
            email_enabled: flag("emailEnabled"),
            sms_enabled: flag("smsEnabled"),
            push_enabled: flag("pushEnabled"),
            weekly_summary_enabled: flag("weeklySummaryEnabled"),
            critical_alerts_only: flag("criticalAlertsOnly"),
            ..Self::default()
        };

        match obj.get("quietHours") {
            None => {}
            Some(Value::Null) => {
                update.quiet_hours_start = Some(None);
                update.quiet_hours_end = Some(None);
            }
            Some(Value::Object(hours)) => {
                if let Some(start) = hours.get("start") {
                    update.quiet_hours_start = Some(quiet_time(start, "quietHours.start")?);
                }
                if let Some(end) = hours.get("end") {
                    update.quiet_hours_end = Some(quiet_time(end, "quietHours.end")?);
                }
            }
            Some(_) => {
                return Err(GovernanceError::Validation(
                    "quietHours must be an object with start and end".into(),
                ));
            }
        }

        if let Some(channels) = obj.get("preferredChannels") {
            let list = channels.as_array().ok_or_else(|| {
                GovernanceError::Validation("preferredChannels must be an array".into())
            })?;
            let mut parsed = Vec::with_capacity(list.len());
            for item in list {
                let name = item.as_str().ok_or_else(|| {
                    GovernanceError::Validation("preferredChannels entries must be strings".into())
                })?;
                let channel = Channel::from_str(name)?;
                if !parsed.contains(&channel) {
                    parsed.push(channel);
                }
            }
            update.preferred_channels = Some(parsed);
        }

        Ok(update)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updated_fields().is_empty()
    }

    /// Names (camelCase, as in the payload) of the fields this update sets.
    #[must_use]
    pub fn updated_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        let mut mark = |present: bool, name: &str| {
            if present {
                fields.push(name.to_string());
            }
        };
        mark(self.email_enabled.is_some(), "emailEnabled");
        mark(self.sms_enabled.is_some(), "smsEnabled");
        mark(self.push_enabled.is_some(), "pushEnabled");
        mark(self.weekly_summary_enabled.is_some(), "weeklySummaryEnabled");
        mark(self.critical_alerts_only.is_some(), "criticalAlertsOnly");
        mark(
            self.quiet_hours_start.is_some() || self.quiet_hours_end.is_some(),
            "quietHours",
        );
        mark(self.preferred_channels.is_some(), "preferredChannels");
        fields
    }

    /// Assign the present fields onto `pref`.
    pub fn apply_to(&self, pref: &mut NotificationPreference) {
        if let Some(v) = self.email_enabled {
            pref.email_enabled = v;
        }
        if let Some(v) = self.sms_enabled {
            pref.sms_enabled = v;
        }
        if let Some(v) = self.push_enabled {
            pref.push_enabled = v;
        }
        if let Some(v) = self.weekly_summary_enabled {
            pref.weekly_summary_enabled = v;
        }
        if let Some(v) = self.critical_alerts_only {
            pref.critical_alerts_only = v;
        }
        if let Some(ref v) = self.quiet_hours_start {
            pref.quiet_hours_start.clone_from(v);
        }
        if let Some(ref v) = self.quiet_hours_end {
            pref.quiet_hours_end.clone_from(v);
        }
        if let Some(ref v) = self.preferred_channels {
            pref.preferred_channels.clone_from(v);
        }
    }
}

/// Boundary booleans: native bools, non-zero numbers, and the strings
/// `true`/`1`/`yes`/`on` (any case) are true. Any other string is false.
fn loose_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn quiet_time(value: &Value, field: &str) -> Result<Option<String>, GovernanceError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => {
            let s = s.trim();
            let well_formed = s.len() == 5
                && s.as_bytes()[2] == b':'
                && NaiveTime::parse_from_str(s, QUIET_HOURS_FORMAT).is_ok();
            if well_formed {
                Ok(Some(s.to_string()))
            } else {
                Err(GovernanceError::Validation(format!("{field} must be HH:MM, got '{s}'")))
            }
        }
        other => Err(GovernanceError::Validation(format!(
            "{field} must be an HH:MM string, got {other}"
        ))),
    }
}

pub struct NotificationPreferenceUpdateBuilder(NotificationPreferenceUpdate);

impl NotificationPreferenceUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(NotificationPreferenceUpdate::default())
    }

    #[must_use]
    pub const fn email_enabled(mut self, enabled: bool) -> Self {
        self.0.email_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub const fn sms_enabled(mut self, enabled: bool) -> Self {
        self.0.sms_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub const fn push_enabled(mut self, enabled: bool) -> Self {
        self.0.push_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub const fn weekly_summary_enabled(mut self, enabled: bool) -> Self {
        self.0.weekly_summary_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub const fn critical_alerts_only(mut self, enabled: bool) -> Self {
        self.0.critical_alerts_only = Some(enabled);
        self
    }

    /// Set (or with `None`, clear) the quiet-hours window. Values are not
    /// validated here; `from_payload` is the validating entry point.
    #[must_use]
    pub fn quiet_hours(mut self, window: Option<(String, String)>) -> Self {
        let (start, end) = window.map_or((None, None), |(s, e)| (Some(s), Some(e)));
        self.0.quiet_hours_start = Some(start);
        self.0.quiet_hours_end = Some(end);
        self
    }

    #[must_use]
    pub fn preferred_channels(mut self, channels: Vec<Channel>) -> Self {
        self.0.preferred_channels = Some(channels);
        self
    }

    #[must_use]
    pub fn build(self) -> NotificationPreferenceUpdate {
        self.0
    }
}

impl Default for NotificationPreferenceUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use trust_core::errors::ErrorKind;

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(1), true)]
    #[case(json!(0), false)]
    #[case(json!(0.5), true)]
    #[case(json!("YES"), true)]
    #[case(json!(" on "), true)]
    #[case(json!("1"), true)]
    #[case(json!("True"), true)]
    #[case(json!("off"), false)]
    #[case(json!("enabled"), false)]
    #[case(json!(null), false)]
    fn loose_booleans(#[case] raw: Value, #[case] expected: bool) {
        let update = NotificationPreferenceUpdate::from_payload(&json!({ "smsEnabled": raw })).unwrap();
        assert_eq!(update.sms_enabled, Some(expected));
        assert_eq!(update.updated_fields(), vec!["smsEnabled".to_string()]);
    }

    #[test]
    fn full_payload_applies_only_present_fields() {
        let update = NotificationPreferenceUpdate::from_payload(&json!({
            "pushEnabled": "yes",
            "quietHours": {"start": "22:00", "end": "07:00"},
            "preferredChannels": ["push", "EMAIL", "push"],
            "unknownKey": 5
        }))
        .unwrap();

        let mut pref = NotificationPreference::defaults("ntf-1", "usr-1", Utc::now());
        update.apply_to(&mut pref);
        assert!(pref.push_enabled);
        assert!(pref.email_enabled);
        assert_eq!(pref.quiet_hours_start.as_deref(), Some("22:00"));
        assert_eq!(pref.quiet_hours_end.as_deref(), Some("07:00"));
        assert_eq!(pref.preferred_channels, vec![Channel::Push, Channel::Email]);
        assert_eq!(
            update.updated_fields(),
            vec!["pushEnabled", "quietHours", "preferredChannels"]
        );
    }

    #[test]
    fn null_quiet_hours_clears_window() {
        let update = NotificationPreferenceUpdate::from_payload(&json!({"quietHours": null})).unwrap();
        let mut pref = NotificationPreference::defaults("ntf-1", "usr-1", Utc::now());
        pref.quiet_hours_start = Some("22:00".into());
        pref.quiet_hours_end = Some("07:00".into());
        update.apply_to(&mut pref);
        assert!(pref.quiet_hours_start.is_none() && pref.quiet_hours_end.is_none());
    }

    #[rstest]
    #[case(json!({"quietHours": {"start": "25:00"}}))]
    #[case(json!({"quietHours": {"start": "7:00"}}))]
    #[case(json!({"quietHours": {"end": 700}}))]
    #[case(json!({"quietHours": "22:00-07:00"}))]
    #[case(json!({"preferredChannels": ["pager"]}))]
    #[case(json!({"preferredChannels": "email"}))]
    #[case(json!(["emailEnabled"]))]
    fn invalid_payloads(#[case] payload: Value) {
        let err = NotificationPreferenceUpdate::from_payload(&payload).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn builder_matches_payload() {
        let built = NotificationPreferenceUpdateBuilder::new()
            .email_enabled(false)
            .quiet_hours(Some(("22:00".into(), "07:00".into())))
            .build();
        let parsed = NotificationPreferenceUpdate::from_payload(&json!({
            "emailEnabled": false,
            "quietHours": {"start": "22:00", "end": "07:00"}
        }))
        .unwrap();
        assert_eq!(built, parsed);
        assert!(NotificationPreferenceUpdate::default().is_empty());
    }
}
