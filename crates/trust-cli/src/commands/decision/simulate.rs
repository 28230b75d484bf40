use anyhow::Context;
use serde_json::Value;
use trust_core::errors::GovernanceError;
use trust_db::governance::SimulateRequest;

use crate::cli::GlobalFlags;
use crate::commands::shared::access::resolve_subject;
use crate::commands::shared::parse::parse_json;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    decision_type: &str,
    input: Option<&str>,
    input_file: Option<&str>,
    subject: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let subject = resolve_subject(&ctx.caller, subject)?;
    let input = read_input(input, input_file)?;

    let outcome = ctx
        .service
        .simulate_decision(
            &ctx.caller,
            SimulateRequest {
                decision_type: decision_type.to_string(),
                subject_user_id: Some(subject),
                input,
            },
        )
        .await?;
    for warning in &outcome.warnings {
        tracing::warn!(decision_id = %outcome.decision.id, %warning, "decision simulate: degraded");
    }
    output(&outcome, flags.format)
}

fn read_input(inline: Option<&str>, file: Option<&str>) -> anyhow::Result<Value> {
    match (inline, file) {
        (Some(raw), _) => Ok(parse_json(raw, "--input")?),
        (None, Some(path)) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read decision input from {path}"))?;
            Ok(parse_json(&raw, path)?)
        }
        (None, None) => Err(GovernanceError::Validation(
            "decision input is required (--input or --input-file)".into(),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::read_input;
    use crate::output::error_response;
    use trust_core::errors::ErrorKind;

    #[test]
    fn inline_input_is_parsed() {
        let value = read_input(Some(r#"{"income": 20000}"#), None).unwrap();
        assert_eq!(value, json!({"income": 20000}));
    }

    #[test]
    fn file_input_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"credit_score": 580}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let value = read_input(None, Some(&path)).unwrap();
        assert_eq!(value["credit_score"], 580);
    }

    #[test]
    fn missing_input_is_a_validation_error() {
        let err = read_input(None, None).unwrap_err();
        assert_eq!(error_response(&err).kind, ErrorKind::Validation);
    }
}
