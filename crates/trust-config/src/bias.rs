//! Bias screening thresholds.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Metric boundaries for the four alert severities.
///
/// For "lower is worse" metrics the tiers descend (`low > medium > high >
/// critical`) and a value strictly below a tier triggers it. For "higher is
/// worse" metrics they ascend and a value at or above a tier triggers it.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct SeverityTiers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl SeverityTiers {
    #[must_use]
    pub const fn new(low: f64, medium: f64, high: f64, critical: f64) -> Self {
        Self {
            low,
            medium,
            high,
            critical,
        }
    }

    fn ascending(&self) -> bool {
        self.low <= self.medium && self.medium <= self.high && self.high <= self.critical
    }

    fn descending(&self) -> bool {
        self.low >= self.medium && self.medium >= self.high && self.high >= self.critical
    }
}

fn default_protected_attributes() -> Vec<String> {
    [
        "age",
        "gender",
        "race",
        "ethnicity",
        "marital_status",
        "religion",
        "nationality",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

const fn default_min_group_samples() -> u32 {
    5
}

const fn default_history_window() -> u32 {
    500
}

const fn default_disparate_impact_tiers() -> SeverityTiers {
    SeverityTiers::new(0.8, 0.7, 0.6, 0.5)
}

const fn default_influence_tiers() -> SeverityTiers {
    SeverityTiers::new(0.05, 0.15, 0.30, 0.50)
}

const fn default_accuracy_tiers() -> SeverityTiers {
    SeverityTiers::new(0.80, 0.75, 0.70, 0.60)
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BiasConfig {
    /// Input fields treated as protected or protected-adjacent.
    #[serde(default = "default_protected_attributes")]
    pub protected_attributes: Vec<String>,

    /// Minimum decisions per group before disparate impact is evaluated.
    #[serde(default = "default_min_group_samples")]
    pub min_group_samples: u32,

    /// Number of recent decisions of the same type considered.
    #[serde(default = "default_history_window")]
    pub history_window: u32,

    /// Lower is worse.
    #[serde(default = "default_disparate_impact_tiers")]
    pub disparate_impact_tiers: SeverityTiers,

    /// Higher is worse.
    #[serde(default = "default_influence_tiers")]
    pub influence_tiers: SeverityTiers,

    /// Lower is worse.
    #[serde(default = "default_accuracy_tiers")]
    pub accuracy_tiers: SeverityTiers,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            protected_attributes: default_protected_attributes(),
            min_group_samples: default_min_group_samples(),
            history_window: default_history_window(),
            disparate_impact_tiers: default_disparate_impact_tiers(),
            influence_tiers: default_influence_tiers(),
            accuracy_tiers: default_accuracy_tiers(),
        }
    }
}

impl BiasConfig {
    #[must_use]
    pub fn is_protected(&self, feature: &str) -> bool {
        self.protected_attributes.iter().any(|a| a == feature)
    }

    /// Check tier ordering and window sizes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.disparate_impact_tiers.descending() {
            return Err(ConfigError::invalid(
                "bias.disparate_impact_tiers",
                "tiers must descend from low to critical",
            ));
        }
        if !self.accuracy_tiers.descending() {
            return Err(ConfigError::invalid(
                "bias.accuracy_tiers",
                "tiers must descend from low to critical",
            ));
        }
        if !self.influence_tiers.ascending() {
            return Err(ConfigError::invalid(
                "bias.influence_tiers",
                "tiers must ascend from low to critical",
            ));
        }
        if self.min_group_samples == 0 {
            return Err(ConfigError::invalid("bias.min_group_samples", "must be at least 1"));
        }
        if self.history_window == 0 {
            return Err(ConfigError::invalid("bias.history_window", "must be at least 1"));
        }
        Ok(())
    }
}
