//! Governed data export.

use trust_core::audit_detail::ExportDetail;
use trust_core::enums::{AuditAction, ResourceType, RiskLevel};
use trust_core::errors::GovernanceError;
use trust_core::identity::Caller;
use trust_core::responses::ExportBundle;

use crate::error::DatabaseError;
use crate::helpers::now_micros;
use crate::repos::audit::{AuditFilter, AuditRecord};
use crate::service::TrustService;

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl TrustService {
    /// Snapshot every decision, consent, override, and alert, plus the most
    /// recent audit entries (at most `governance.export_audit_limit`).
    /// Audited as `data_export` at medium risk.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a query fails.
    pub async fn export_snapshot(&self, caller: &Caller) -> Result<ExportBundle, GovernanceError> {
        let audit = AuditRecord::new(AuditAction::DataExport, caller).risk(RiskLevel::Medium);

        let bundle = match self.collect_export().await {
            Ok(bundle) => bundle,
            Err(e) => {
                let err = GovernanceError::from(e);
                self.record_audit(audit.failure(&err)).await;
                return Err(err);
            }
        };

        let detail = ExportDetail {
            decisions: count(bundle.decisions.len()),
            consents: count(bundle.consents.len()),
            overrides: count(bundle.overrides.len()),
            bias_alerts: count(bundle.bias_alerts.len()),
            audit_logs: count(bundle.audit_logs.len()),
        };
        tracing::debug!(?detail, "export: snapshot collected");
        self.record_audit(
            audit
                .resource(ResourceType::Export, bundle.exported_at.to_rfc3339())
                .details(&detail),
        )
        .await;
        Ok(bundle)
    }

    async fn collect_export(&self) -> Result<ExportBundle, DatabaseError> {
        let audit_logs = self
            .query_audit_logs(&AuditFilter {
                limit: Some(self.config().governance.export_audit_limit),
                ..AuditFilter::default()
            })
            .await?;
        Ok(ExportBundle {
            decisions: self.all_decisions().await?,
            consents: self.all_consents().await?,
            overrides: self.all_overrides().await?,
            bias_alerts: self.all_bias_alerts().await?,
            audit_logs,
            exported_at: now_micros(),
        })
    }
}
