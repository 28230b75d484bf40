//! Per-model usage report.

use trust_core::errors::GovernanceError;
use trust_core::responses::ModelPerformance;

use crate::service::TrustService;

impl TrustService {
    /// Decision volume, average confidence, favorable rate, and open alerts
    /// for every registered model, in decision type order.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a query fails.
    pub async fn model_performance(&self) -> Result<Vec<ModelPerformance>, GovernanceError> {
        let mut report = Vec::new();
        for model in self.engine().registry().models() {
            let name = model.name();
            let decision_type = model.decision_type();
            let outcomes = self.outcome_counts_for_model(name).await?;

            let decisions: u64 = outcomes.iter().map(|(_, n)| n).sum();
            let favorable: u64 = outcomes
                .iter()
                .filter(|(outcome, _)| decision_type.is_favorable(outcome))
                .map(|(_, n)| n)
                .sum();

            report.push(ModelPerformance {
                decision_type,
                model_name: name.to_string(),
                model_version: model.version().to_string(),
                reference_accuracy: model.reference_accuracy(),
                decisions,
                average_confidence: self.average_confidence_for_model(name).await?,
                favorable_rate: rate(favorable, decisions),
                open_alerts: self.count_open_alerts_for_model(name).await?,
            });
        }
        tracing::debug!(models = report.len(), "models: performance report built");
        Ok(report)
    }
}

fn rate(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let part = u32::try_from(part).unwrap_or(u32::MAX);
    let total = u32::try_from(total).unwrap_or(u32::MAX);
    Some(f64::from(part) / f64::from(total))
}
