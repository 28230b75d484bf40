//! Bias Screener: fairness checks over a decision, its explanation, and the
//! recent outcome history of its decision type.
//!
//! Alerts are additive. Screening the same decision twice yields two sets of
//! drafts; the pipeline screens once, at creation.

use std::collections::BTreeMap;
use trust_config::{BiasConfig, SeverityTiers};
use trust_core::entities::{AlertDraft, Decision, ExplanationData};
use trust_core::enums::{AlertType, Severity};
use trust_core::responses::DecisionTypeFairness;

use crate::error::EngineError;
use crate::explainer::{METRIC_OVERALL_ACCURACY, METRIC_PROTECTED_INFLUENCE};
use crate::history::{OutcomeHistory, group_label};

pub const METRIC_DISPARATE_IMPACT: &str = "disparate_impact_ratio";

/// Which direction of a metric is harmful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsWorse,
    HigherIsWorse,
}

/// Severity reached by `value` and the tier boundary that triggered it.
#[must_use]
pub fn classify(value: f64, tiers: &SeverityTiers, direction: Direction) -> Option<(Severity, f64)> {
    let ladder = [
        (Severity::Critical, tiers.critical),
        (Severity::High, tiers.high),
        (Severity::Medium, tiers.medium),
        (Severity::Low, tiers.low),
    ];
    ladder.into_iter().find(|(_, bound)| match direction {
        Direction::LowerIsWorse => value < *bound,
        Direction::HigherIsWorse => value >= *bound,
    })
}

#[derive(Debug, Clone)]
pub struct BiasScreener {
    config: BiasConfig,
}

impl BiasScreener {
    #[must_use]
    pub const fn new(config: BiasConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &BiasConfig {
        &self.config
    }

    /// Run every check. `explanation` is `None` when explanation failed;
    /// explanation-based checks are then skipped.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Internal` when `history` belongs to another
    /// decision type or does not contain the decision being screened.
    pub fn screen(
        &self,
        decision: &Decision,
        explanation: Option<&ExplanationData>,
        history: &OutcomeHistory,
    ) -> Result<Vec<AlertDraft>, EngineError> {
        if history.decision_type() != decision.decision_type {
            return Err(EngineError::Internal(format!(
                "history for {} cannot screen a {} decision",
                history.decision_type(),
                decision.decision_type
            )));
        }
        if !history.contains(&decision.id) {
            return Err(EngineError::Internal(format!(
                "history does not include decision {}",
                decision.id
            )));
        }

        let mut drafts = self.check_disparate_impact(decision, history);
        if let Some(explanation) = explanation {
            drafts.extend(self.check_protected_influence(decision, explanation));
            drafts.extend(self.check_accuracy(decision, explanation));
        }

        tracing::debug!(
            decision_id = %decision.id,
            alerts = drafts.len(),
            history = history.len(),
            "screener: decision screened"
        );
        Ok(drafts)
    }

    fn check_disparate_impact(&self, decision: &Decision, history: &OutcomeHistory) -> Vec<AlertDraft> {
        let min_samples = self.config.min_group_samples;
        let mut drafts = Vec::new();

        for attribute in &self.config.protected_attributes {
            let Some(group) = decision
                .input_data
                .get(attribute)
                .and_then(|v| group_label(attribute, v))
            else {
                continue;
            };
            let tallies = history.group_tallies(attribute);
            let Some(subject) = tallies.get(&group).filter(|t| t.total >= min_samples) else {
                continue;
            };
            let Some((best_group, best)) = tallies
                .iter()
                .filter(|(_, t)| t.total >= min_samples)
                .max_by(|a, b| a.1.rate().total_cmp(&b.1.rate()))
            else {
                continue;
            };
            if best_group == &group || best.rate() <= f64::EPSILON {
                continue;
            }

            let ratio = subject.rate() / best.rate();
            if let Some((severity, threshold)) = classify(
                ratio,
                &self.config.disparate_impact_tiers,
                Direction::LowerIsWorse,
            ) {
                drafts.push(AlertDraft {
                    decision_id: decision.id.clone(),
                    decision_type: decision.decision_type,
                    alert_type: AlertType::DisparateImpact,
                    protected_attribute: Some(attribute.clone()),
                    metric_name: METRIC_DISPARATE_IMPACT.to_string(),
                    metric_value: ratio,
                    threshold,
                    severity,
                    description: format!(
                        "{attribute} group '{group}' receives favorable {} outcomes at {:.0}% of the rate of group '{best_group}' ({}/{} vs {}/{})",
                        decision.decision_type,
                        ratio * 100.0,
                        subject.favorable,
                        subject.total,
                        best.favorable,
                        best.total
                    ),
                });
            }
        }
        drafts
    }

    fn check_protected_influence(
        &self,
        decision: &Decision,
        explanation: &ExplanationData,
    ) -> Option<AlertDraft> {
        let influence = explanation.metric(METRIC_PROTECTED_INFLUENCE)?;
        let (severity, threshold) =
            classify(influence, &self.config.influence_tiers, Direction::HigherIsWorse)?;
        let dominant = explanation
            .feature_contributions
            .iter()
            .find(|c| self.config.is_protected(&c.feature))
            .map(|c| c.feature.clone());
        Some(AlertDraft {
            decision_id: decision.id.clone(),
            decision_type: decision.decision_type,
            alert_type: AlertType::ProtectedFeatureInfluence,
            description: format!(
                "protected features carry {:.0}% of the attribution for this {} decision{}",
                influence * 100.0,
                decision.decision_type,
                dominant
                    .as_deref()
                    .map(|f| format!(" (largest: {f})"))
                    .unwrap_or_default()
            ),
            protected_attribute: dominant,
            metric_name: METRIC_PROTECTED_INFLUENCE.to_string(),
            metric_value: influence,
            threshold,
            severity,
        })
    }

    fn check_accuracy(&self, decision: &Decision, explanation: &ExplanationData) -> Option<AlertDraft> {
        let accuracy = explanation.metric(METRIC_OVERALL_ACCURACY)?;
        let (severity, threshold) =
            classify(accuracy, &self.config.accuracy_tiers, Direction::LowerIsWorse)?;
        Some(AlertDraft {
            decision_id: decision.id.clone(),
            decision_type: decision.decision_type,
            alert_type: AlertType::AccuracyDegradation,
            protected_attribute: None,
            metric_name: METRIC_OVERALL_ACCURACY.to_string(),
            metric_value: accuracy,
            threshold,
            severity,
            description: format!(
                "model {} {} accuracy {:.2} is below {:.2}",
                decision.model_name, decision.model_version, accuracy, threshold
            ),
        })
    }

    /// Favorable rate and per-attribute disparate impact over a history.
    /// Disparate impact is lowest group rate over highest, among groups with
    /// enough samples; attributes with fewer than two such groups are omitted.
    #[must_use]
    pub fn fairness_summary(&self, history: &OutcomeHistory) -> DecisionTypeFairness {
        let overall = history.overall();
        let mut disparate_impact = BTreeMap::new();
        for attribute in history.observed_attributes() {
            let rates: Vec<f64> = history
                .group_tallies(&attribute)
                .values()
                .filter(|t| t.total >= self.config.min_group_samples)
                .map(|t| t.rate())
                .collect();
            if rates.len() < 2 {
                continue;
            }
            let max = rates.iter().copied().fold(f64::MIN, f64::max);
            let min = rates.iter().copied().fold(f64::MAX, f64::min);
            if max > f64::EPSILON {
                disparate_impact.insert(attribute, min / max);
            }
        }
        DecisionTypeFairness {
            decision_type: history.decision_type(),
            total: overall.total,
            favorable_rate: overall.rate(),
            disparate_impact,
        }
    }
}
