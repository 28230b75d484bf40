use serde_json::{Value, json};
use trust_config::EngineConfig;
use trust_core::enums::DecisionType;

use super::{DecisionModel, ModelOutput, clamp01, contribution};
use crate::error::EngineError;
use crate::payload::{Bounds, InputReader};

const CREDIT_WEIGHT: f64 = 0.55;
const AFFORDABILITY_WEIGHT: f64 = 0.35;
const TENURE_WEIGHT: f64 = 0.10;
/// Loan-to-income ratio at which affordability reaches zero.
const LTI_CEILING: f64 = 5.0;
const HARD_DENIAL_CONFIDENCE: f64 = 0.95;

/// Gradient-boosted loan approval stand-in.
#[derive(Debug, Clone)]
pub struct LoanApprovalModel {
    approval_threshold: f64,
    review_threshold: f64,
    min_credit_score: f64,
    max_lti: f64,
}

impl LoanApprovalModel {
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self {
            approval_threshold: config.loan_approval_threshold,
            review_threshold: config.loan_review_threshold,
            min_credit_score: config.loan_min_credit_score,
            max_lti: config.loan_max_lti,
        }
    }
}

impl DecisionModel for LoanApprovalModel {
    fn decision_type(&self) -> DecisionType {
        DecisionType::LoanApproval
    }

    fn name(&self) -> &'static str {
        "loan_approval_gbm"
    }

    fn version(&self) -> &'static str {
        "2.3.0"
    }

    fn reference_accuracy(&self) -> f64 {
        0.87
    }

    fn evaluate(&self, input: &Value) -> Result<ModelOutput, EngineError> {
        let reader = InputReader::new(input)?;
        let income = reader.required_f64("income", Bounds::POSITIVE)?;
        let requested = reader.required_f64("requested_amount", Bounds::POSITIVE)?;
        let credit_score = reader.required_f64("credit_score", Bounds::between(300.0, 850.0))?;
        let debt = reader.optional_f64("existing_debt", 0.0, Bounds::NON_NEGATIVE)?;
        let years = reader.optional_f64("employment_years", 0.0, Bounds::NON_NEGATIVE)?;

        let credit = (credit_score - 300.0) / 550.0;
        let lti = (requested + debt) / income;
        let affordability = clamp01(1.0 - lti / LTI_CEILING);
        let tenure = (years / 10.0).min(1.0);
        let score = CREDIT_WEIGHT.mul_add(
            credit,
            AFFORDABILITY_WEIGHT.mul_add(affordability, TENURE_WEIGHT * tenure),
        );

        let rule = if credit_score < self.min_credit_score {
            Some(format!("credit_score below {}", self.min_credit_score))
        } else if lti > self.max_lti {
            Some(format!("loan_to_income above {}", self.max_lti))
        } else {
            None
        };

        let midpoint = (self.review_threshold + self.approval_threshold) / 2.0;
        let (outcome, confidence) = if rule.is_some() {
            ("denied", HARD_DENIAL_CONFIDENCE)
        } else if score >= self.approval_threshold {
            ("approved", score)
        } else if score >= self.review_threshold {
            ("manual_review", clamp01(0.5 + (score - midpoint).abs()))
        } else {
            ("denied", 1.0 - score)
        };

        Ok(ModelOutput {
            score,
            outcome: outcome.to_string(),
            confidence: clamp01(confidence),
            boundaries: vec![self.review_threshold, self.approval_threshold],
            contributions: vec![
                contribution("credit_score", json!(credit_score), CREDIT_WEIGHT, credit),
                contribution("loan_to_income", json!(lti), AFFORDABILITY_WEIGHT, affordability),
                contribution("employment_years", json!(years), TENURE_WEIGHT, tenure),
            ],
            rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LoanApprovalModel {
        LoanApprovalModel::from_config(&EngineConfig::default())
    }

    #[test]
    fn unaffordable_loan_is_denied() {
        let out = model()
            .evaluate(&json!({"income": 20000, "requested_amount": 100000, "credit_score": 580}))
            .unwrap();
        assert_eq!(out.outcome, "denied");
        assert!((out.score - 0.28).abs() < 1e-9);
        assert!((out.confidence - 0.72).abs() < 1e-9);
        assert!(out.rule.is_none());
    }

    #[test]
    fn strong_application_is_approved() {
        let out = model()
            .evaluate(&json!({
                "income": 120000,
                "requested_amount": 30000,
                "credit_score": 800,
                "employment_years": 12
            }))
            .unwrap();
        assert_eq!(out.outcome, "approved");
        assert!((out.confidence - out.score).abs() < 1e-12);
    }

    #[test]
    fn low_credit_score_is_hard_denied() {
        let out = model()
            .evaluate(&json!({"income": 90000, "requested_amount": 5000, "credit_score": 450}))
            .unwrap();
        assert_eq!(out.outcome, "denied");
        assert!((out.confidence - 0.95).abs() < 1e-12);
        assert!(out.rule.is_some());
    }

    #[test]
    fn middling_application_goes_to_review() {
        // 0.55 * 0.8 + 0.35 * 0.5 = 0.615
        let out = model()
            .evaluate(&json!({"income": 40000, "requested_amount": 100000, "credit_score": 740}))
            .unwrap();
        assert_eq!(out.outcome, "manual_review");
        assert!((0.5..=1.0).contains(&out.confidence));
    }
}
