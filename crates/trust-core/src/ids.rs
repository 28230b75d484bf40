//! ID prefix constants.
//!
//! Every entity ID is `{prefix}-{8 hex chars}`, generated by the database
//! (see `TrustDb::generate_id`).

pub const PREFIX_DECISION: &str = "dec";
pub const PREFIX_EXPLANATION: &str = "exp";
pub const PREFIX_BIAS_ALERT: &str = "bal";
pub const PREFIX_OVERRIDE: &str = "ovr";
pub const PREFIX_AUDIT: &str = "aud";
pub const PREFIX_NOTIFICATION_PREF: &str = "ntf";
pub const PREFIX_CONSENT: &str = "cns";

/// All prefixes, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_DECISION,
    PREFIX_EXPLANATION,
    PREFIX_BIAS_ALERT,
    PREFIX_OVERRIDE,
    PREFIX_AUDIT,
    PREFIX_NOTIFICATION_PREF,
    PREFIX_CONSENT,
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::ALL_PREFIXES;

    #[test]
    fn prefixes_are_unique_and_three_chars() {
        let unique: HashSet<_> = ALL_PREFIXES.iter().collect();
        assert_eq!(unique.len(), ALL_PREFIXES.len());
        assert!(ALL_PREFIXES.iter().all(|p| p.len() == 3));
    }
}
