//! Outcome history: favorable/unfavorable tallies per protected group.

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use trust_core::entities::Decision;
use trust_core::enums::DecisionType;

pub const AGE_ATTRIBUTE: &str = "age";

/// Favorable count over total for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupTally {
    pub favorable: u32,
    pub total: u32,
}

impl GroupTally {
    #[must_use]
    pub fn rate(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.favorable) / f64::from(self.total)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OutcomeSample {
    favorable: bool,
    /// Protected attribute -> group label.
    groups: BTreeMap<String, String>,
}

/// Recent outcomes of one decision type, grouped by protected attributes.
#[derive(Debug, Clone)]
pub struct OutcomeHistory {
    decision_type: DecisionType,
    protected_attributes: Vec<String>,
    seen: HashSet<String>,
    samples: Vec<OutcomeSample>,
}

impl OutcomeHistory {
    #[must_use]
    pub fn new(decision_type: DecisionType, protected_attributes: &[String]) -> Self {
        Self {
            decision_type,
            protected_attributes: protected_attributes.to_vec(),
            seen: HashSet::new(),
            samples: Vec::new(),
        }
    }

    /// Build from stored decisions, skipping other decision types.
    #[must_use]
    pub fn from_decisions(
        decision_type: DecisionType,
        protected_attributes: &[String],
        decisions: &[Decision],
    ) -> Self {
        let mut history = Self::new(decision_type, protected_attributes);
        for decision in decisions {
            history.record(decision);
        }
        history
    }

    /// Add one decision. Decisions of another type or already recorded are ignored.
    pub fn record(&mut self, decision: &Decision) {
        if decision.decision_type != self.decision_type || !self.seen.insert(decision.id.clone()) {
            return;
        }
        let groups = self
            .protected_attributes
            .iter()
            .filter_map(|attr| {
                group_label(attr, decision.input_data.get(attr)?).map(|g| (attr.clone(), g))
            })
            .collect();
        self.samples.push(OutcomeSample {
            favorable: decision.is_favorable(),
            groups,
        });
    }

    #[must_use]
    pub const fn decision_type(&self) -> DecisionType {
        self.decision_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn contains(&self, decision_id: &str) -> bool {
        self.seen.contains(decision_id)
    }

    #[must_use]
    pub fn overall(&self) -> GroupTally {
        self.samples.iter().fold(GroupTally::default(), |mut t, s| {
            t.total += 1;
            t.favorable += u32::from(s.favorable);
            t
        })
    }

    /// Tallies per group for `attribute`. Samples without the attribute are skipped.
    #[must_use]
    pub fn group_tallies(&self, attribute: &str) -> BTreeMap<String, GroupTally> {
        let mut tallies: BTreeMap<String, GroupTally> = BTreeMap::new();
        for sample in &self.samples {
            if let Some(group) = sample.groups.get(attribute) {
                let tally = tallies.entry(group.clone()).or_default();
                tally.total += 1;
                tally.favorable += u32::from(sample.favorable);
            }
        }
        tallies
    }

    /// Attributes that appear in at least one sample.
    #[must_use]
    pub fn observed_attributes(&self) -> Vec<String> {
        self.protected_attributes
            .iter()
            .filter(|a| self.samples.iter().any(|s| s.groups.contains_key(*a)))
            .cloned()
            .collect()
    }
}

/// Group label for a protected attribute value. Ages are bucketed; other
/// values use their lowercase string form. Nulls and containers have no group.
#[must_use]
pub fn group_label(attribute: &str, value: &Value) -> Option<String> {
    if attribute == AGE_ATTRIBUTE {
        let age = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        return Some(age_bucket(age).to_string());
    }
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_lowercase()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[must_use]
pub fn age_bucket(age: f64) -> &'static str {
    if age < 25.0 {
        "under_25"
    } else if age < 40.0 {
        "25_to_39"
    } else if age < 60.0 {
        "40_to_59"
    } else {
        "60_plus"
    }
}
