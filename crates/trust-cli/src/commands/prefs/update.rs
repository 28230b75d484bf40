use serde_json::{Map, Value, json};
use trust_db::updates::NotificationPreferenceUpdate;

use crate::cli::GlobalFlags;
use crate::commands::shared::access::resolve_subject;
use crate::commands::shared::parse::parse_json;
use crate::context::AppContext;
use crate::output::output;

/// Where the update comes from: a raw camelCase payload or typed flags.
pub enum Payload<'a> {
    Json(&'a str),
    Flags(PreferenceFlags<'a>),
}

#[derive(Debug, Default)]
pub struct PreferenceFlags<'a> {
    pub email: Option<bool>,
    pub sms: Option<bool>,
    pub push: Option<bool>,
    pub weekly_summary: Option<bool>,
    pub critical_only: Option<bool>,
    pub quiet_hours: Option<&'a str>,
    pub channels: Option<&'a str>,
}

pub async fn run(
    user: Option<&str>,
    payload: &Payload<'_>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let user_id = resolve_subject(&ctx.caller, user)?;
    let payload = match payload {
        Payload::Json(raw) => parse_json(raw, "--payload")?,
        Payload::Flags(typed) => flags_payload(typed),
    };
    let update = NotificationPreferenceUpdate::from_payload(&payload)?;
    let pref = ctx
        .service
        .update_notification_preferences(&ctx.caller, &user_id, &update)
        .await?;
    output(&pref, flags.format)
}

/// Typed flags rewritten into the camelCase payload shape.
fn flags_payload(typed: &PreferenceFlags<'_>) -> Value {
    let mut map = Map::new();
    for (key, value) in [
        ("emailEnabled", typed.email),
        ("smsEnabled", typed.sms),
        ("pushEnabled", typed.push),
        ("weeklySummaryEnabled", typed.weekly_summary),
        ("criticalAlertsOnly", typed.critical_only),
    ] {
        if let Some(value) = value {
            map.insert(key.to_string(), Value::Bool(value));
        }
    }
    if let Some(raw) = typed.quiet_hours {
        map.insert("quietHours".to_string(), quiet_hours_value(raw));
    }
    if let Some(raw) = typed.channels {
        let channels = raw
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| Value::String(c.to_string()))
            .collect();
        map.insert("preferredChannels".to_string(), Value::Array(channels));
    }
    Value::Object(map)
}

/// `22:00-07:00` becomes a start/end object and `none` clears the window;
/// anything else is passed through for the payload parser to reject.
fn quiet_hours_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Value::Null;
    }
    match raw.split_once('-') {
        Some((start, end)) => json!({"start": start.trim(), "end": end.trim()}),
        None => Value::String(raw.to_string()),
    }
}
