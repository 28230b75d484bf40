use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_jsonlines::JsonLinesWriter;
use trust_core::entities::{AuditLog, BiasAlert, Consent, Decision, DecisionOverride};
use trust_core::errors::GovernanceError;
use trust_core::identity::COMPLIANCE_ROLES;
use trust_core::responses::ExportBundle;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ExportArgs;
use crate::commands::shared::access::require_roles;
use crate::context::AppContext;
use crate::output::output;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Jsonl,
}

impl ExportFormat {
    /// # Errors
    ///
    /// Returns `Validation` for anything but `json` or `jsonl`.
    pub fn parse(raw: &str) -> Result<Self, GovernanceError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "jsonlines" => Ok(Self::Jsonl),
            other => Err(GovernanceError::Validation(format!(
                "unsupported export format '{other}' (expected json or jsonl)"
            ))),
        }
    }
}

/// Record counts of a bundle; the first line of a JSON Lines export.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExportManifest {
    pub exported_at: DateTime<Utc>,
    pub decisions: usize,
    pub consents: usize,
    pub overrides: usize,
    pub bias_alerts: usize,
    pub audit_logs: usize,
}

impl ExportManifest {
    fn of(bundle: &ExportBundle) -> Self {
        Self {
            exported_at: bundle.exported_at,
            decisions: bundle.decisions.len(),
            consents: bundle.consents.len(),
            overrides: bundle.overrides.len(),
            bias_alerts: bundle.bias_alerts.len(),
            audit_logs: bundle.audit_logs.len(),
        }
    }
}

/// One line of a JSON Lines export: `{"kind": ..., "record": {...}}`.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
enum ExportLine<'a> {
    Manifest(ExportManifest),
    Decision(&'a Decision),
    Consent(&'a Consent),
    Override(&'a DecisionOverride),
    BiasAlert(&'a BiasAlert),
    AuditLog(&'a AuditLog),
}

fn export_lines(bundle: &ExportBundle) -> Vec<ExportLine<'_>> {
    let mut lines = vec![ExportLine::Manifest(ExportManifest::of(bundle))];
    lines.extend(bundle.decisions.iter().map(ExportLine::Decision));
    lines.extend(bundle.consents.iter().map(ExportLine::Consent));
    lines.extend(bundle.overrides.iter().map(ExportLine::Override));
    lines.extend(bundle.bias_alerts.iter().map(ExportLine::BiasAlert));
    lines.extend(bundle.audit_logs.iter().map(ExportLine::AuditLog));
    lines
}

#[derive(Debug, Serialize)]
struct ExportSummary {
    path: String,
    format: ExportFormat,
    #[serde(flatten)]
    manifest: ExportManifest,
}

/// Handle `trustai export`.
pub async fn handle(args: &ExportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let format = ExportFormat::parse(&args.file_format)?;
    require_roles(&ctx.caller, COMPLIANCE_ROLES)?;
    let bundle = ctx.service.export_snapshot(&ctx.caller).await?;

    match args.output.as_deref() {
        Some(path) => {
            write_bundle(Path::new(path), &bundle, format)?;
            tracing::info!(path, ?format, "export: written");
            output(
                &ExportSummary {
                    path: path.to_string(),
                    format,
                    manifest: ExportManifest::of(&bundle),
                },
                flags.format,
            )
        }
        None => match format {
            ExportFormat::Json => output(&bundle, flags.format),
            ExportFormat::Jsonl => {
                let mut writer = JsonLinesWriter::new(std::io::stdout().lock());
                writer.write_all(export_lines(&bundle))?;
                writer.flush()?;
                Ok(())
            }
        },
    }
}

/// Write the bundle to `path` as pretty JSON or JSON Lines.
pub fn write_bundle(path: &Path, bundle: &ExportBundle, format: ExportFormat) -> anyhow::Result<()> {
    match format {
        ExportFormat::Json => {
            let json = serde_json::to_vec_pretty(bundle)?;
            std::fs::write(path, json)
        }
        ExportFormat::Jsonl => serde_jsonlines::write_json_lines(path, export_lines(bundle)),
    }
    .with_context(|| format!("failed to write export to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use trust_config::TrustConfig;
    use trust_core::errors::ErrorKind;
    use trust_core::identity::{Actor, Caller, RequestOrigin, Role};
    use trust_core::responses::ExportBundle;
    use trust_db::TrustService;
    use trust_db::governance::SimulateRequest;

    use super::{ExportFormat, write_bundle};

    async fn bundle_with_one_decision() -> ExportBundle {
        let svc = TrustService::open_in_memory(TrustConfig::default()).await.unwrap();
        let customer = Caller::new(
            Some(Actor::new("usr-alice", Role::Customer)),
            RequestOrigin::default(),
        );
        svc.simulate_decision(
            &customer,
            SimulateRequest {
                decision_type: "loan_approval".into(),
                subject_user_id: None,
                input: json!({"income": 20000, "requested_amount": 100_000, "credit_score": 580}),
            },
        )
        .await
        .unwrap();
        let officer = Caller::new(
            Some(Actor::new("usr-olga", Role::ComplianceOfficer)),
            RequestOrigin::default(),
        );
        svc.export_snapshot(&officer).await.unwrap()
    }

    #[test]
    fn only_json_and_jsonl_are_supported() {
        assert_eq!(ExportFormat::parse("JSON").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("jsonl").unwrap(), ExportFormat::Jsonl);
        let err = ExportFormat::parse("csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn jsonl_export_starts_with_a_manifest() {
        let bundle = bundle_with_one_decision().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.jsonl");

        write_bundle(&path, &bundle, ExportFormat::Jsonl).unwrap();

        let lines: Vec<Value> = serde_jsonlines::json_lines(&path)
            .unwrap()
            .collect::<std::io::Result<_>>()
            .unwrap();
        let total = bundle.decisions.len()
            + bundle.consents.len()
            + bundle.overrides.len()
            + bundle.bias_alerts.len()
            + bundle.audit_logs.len();
        assert_eq!(lines.len(), total + 1);
        assert_eq!(lines[0]["kind"], "manifest");
        assert_eq!(lines[0]["record"]["decisions"], 1);
        assert_eq!(lines[1]["kind"], "decision");
        assert_eq!(lines[1]["record"]["outcome"], "denied");
        assert!(lines.iter().any(|l| l["kind"] == "audit_log"));
    }

    #[tokio::test]
    async fn json_export_round_trips_the_bundle() {
        let bundle = bundle_with_one_decision().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        write_bundle(&path, &bundle, ExportFormat::Json).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
        let restored: ExportBundle = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, bundle);
    }
}
