use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use trust_core::enums::DecisionType;
use trust_core::errors::GovernanceError;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> Result<T, GovernanceError>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().replace('-', "_");
    serde_json::from_value(Value::String(normalized))
        .map_err(|_| GovernanceError::Validation(format!("invalid {field} '{raw}'")))
}

/// Decision type names, including the `fraud_check` and `risk_profile` aliases.
pub fn parse_decision_type(raw: &str) -> Result<DecisionType, GovernanceError> {
    DecisionType::from_str(&raw.replace('-', "_"))
}

/// An RFC 3339 timestamp.
pub fn parse_since(raw: &str) -> Result<DateTime<Utc>, GovernanceError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| GovernanceError::Validation(format!("invalid --since '{raw}': {e}")))
}

/// A JSON document given on the command line.
pub fn parse_json(raw: &str, field: &str) -> Result<Value, GovernanceError> {
    serde_json::from_str(raw)
        .map_err(|e| GovernanceError::Validation(format!("{field} is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trust_core::enums::{DecisionType, InvestigationStatus, RiskLevel};
    use trust_core::errors::ErrorKind;

    use super::{parse_decision_type, parse_enum, parse_json, parse_since};

    #[test]
    fn parses_snake_case_and_hyphenated_enums() {
        let status: InvestigationStatus = parse_enum("investigating", "status").unwrap();
        assert_eq!(status, InvestigationStatus::Investigating);
        let risk: RiskLevel = parse_enum(" critical ", "risk").unwrap();
        assert_eq!(risk, RiskLevel::Critical);
    }

    #[test]
    fn invalid_enum_is_a_validation_error() {
        let err = parse_enum::<RiskLevel>("extreme", "risk").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("invalid risk 'extreme'"));
    }

    #[test]
    fn decision_type_aliases_and_unknown_types() {
        assert_eq!(parse_decision_type("fraud-check").unwrap(), DecisionType::FraudDetection);
        assert_eq!(parse_decision_type("risk_profile").unwrap(), DecisionType::RiskProfiling);
        let err = parse_decision_type("mortgage").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedDecisionType);
    }

    #[test]
    fn since_accepts_offsets() {
        let ts = parse_since("2026-03-01T10:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-03-01T08:00:00+00:00");
        assert!(parse_since("yesterday").is_err());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(parse_json(r#"{"income": 1}"#, "input").is_ok());
        let err = parse_json("{income", "input").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
