//! Decision thresholds for the simulated models.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_loan_approval_threshold() -> f64 {
    0.65
}

const fn default_loan_review_threshold() -> f64 {
    0.45
}

const fn default_loan_min_credit_score() -> f64 {
    500.0
}

const fn default_loan_max_lti() -> f64 {
    10.0
}

const fn default_fraud_flag_threshold() -> f64 {
    0.5
}

const fn default_offer_premium_threshold() -> f64 {
    0.6
}

const fn default_offer_standard_threshold() -> f64 {
    0.3
}

const fn default_risk_aggressive_threshold() -> f64 {
    0.66
}

const fn default_risk_moderate_threshold() -> f64 {
    0.33
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EngineConfig {
    /// Loan score at or above which an application is approved.
    #[serde(default = "default_loan_approval_threshold")]
    pub loan_approval_threshold: f64,

    /// Loan score at or above which an application goes to manual review.
    #[serde(default = "default_loan_review_threshold")]
    pub loan_review_threshold: f64,

    /// Credit scores below this are denied outright.
    #[serde(default = "default_loan_min_credit_score")]
    pub loan_min_credit_score: f64,

    /// Loan-to-income ratios above this are denied outright.
    #[serde(default = "default_loan_max_lti")]
    pub loan_max_lti: f64,

    #[serde(default = "default_fraud_flag_threshold")]
    pub fraud_flag_threshold: f64,

    #[serde(default = "default_offer_premium_threshold")]
    pub offer_premium_threshold: f64,

    #[serde(default = "default_offer_standard_threshold")]
    pub offer_standard_threshold: f64,

    #[serde(default = "default_risk_aggressive_threshold")]
    pub risk_aggressive_threshold: f64,

    #[serde(default = "default_risk_moderate_threshold")]
    pub risk_moderate_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            loan_approval_threshold: default_loan_approval_threshold(),
            loan_review_threshold: default_loan_review_threshold(),
            loan_min_credit_score: default_loan_min_credit_score(),
            loan_max_lti: default_loan_max_lti(),
            fraud_flag_threshold: default_fraud_flag_threshold(),
            offer_premium_threshold: default_offer_premium_threshold(),
            offer_standard_threshold: default_offer_standard_threshold(),
            risk_aggressive_threshold: default_risk_aggressive_threshold(),
            risk_moderate_threshold: default_risk_moderate_threshold(),
        }
    }
}

impl EngineConfig {
    /// Check that score thresholds are fractions and bands are ordered.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractions = [
            ("engine.loan_approval_threshold", self.loan_approval_threshold),
            ("engine.loan_review_threshold", self.loan_review_threshold),
            ("engine.fraud_flag_threshold", self.fraud_flag_threshold),
            ("engine.offer_premium_threshold", self.offer_premium_threshold),
            ("engine.offer_standard_threshold", self.offer_standard_threshold),
            ("engine.risk_aggressive_threshold", self.risk_aggressive_threshold),
            ("engine.risk_moderate_threshold", self.risk_moderate_threshold),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")));
            }
        }
        if self.loan_review_threshold >= self.loan_approval_threshold {
            return Err(ConfigError::invalid(
                "engine.loan_review_threshold",
                "must be below loan_approval_threshold",
            ));
        }
        if self.offer_standard_threshold >= self.offer_premium_threshold {
            return Err(ConfigError::invalid(
                "engine.offer_standard_threshold",
                "must be below offer_premium_threshold",
            ));
        }
        if self.risk_moderate_threshold >= self.risk_aggressive_threshold {
            return Err(ConfigError::invalid(
                "engine.risk_moderate_threshold",
                "must be below risk_aggressive_threshold",
            ));
        }
        if self.loan_max_lti <= 0.0 {
            return Err(ConfigError::invalid("engine.loan_max_lti", "must be positive"));
        }
        Ok(())
    }
}
