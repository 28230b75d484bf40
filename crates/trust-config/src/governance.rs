//! Governance policy switches.

use serde::{Deserialize, Serialize};

const fn default_export_audit_limit() -> u32 {
    1000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GovernanceConfig {
    /// Refuse to simulate a decision unless the subject granted the matching consent.
    #[serde(default)]
    pub require_consent: bool,

    /// Maximum audit entries included in a data export.
    #[serde(default = "default_export_audit_limit")]
    pub export_audit_limit: u32,

    /// Offset from UTC used as the subjects' local time when evaluating quiet hours.
    #[serde(default)]
    pub local_utc_offset_minutes: i32,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            require_consent: false,
            export_audit_limit: default_export_audit_limit(),
            local_utc_offset_minutes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GovernanceConfig::default();
        assert!(!config.require_consent);
        assert_eq!(config.export_audit_limit, 1000);
        assert_eq!(config.local_utc_offset_minutes, 0);
    }
}
