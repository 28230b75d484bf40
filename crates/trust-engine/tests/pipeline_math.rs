//! Engine -> explainer -> screener flows over in-memory decisions.

use chrono::Utc;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use trust_config::{BiasConfig, EngineConfig};
use trust_core::entities::Decision;
use trust_core::enums::{AlertType, DecisionType, Severity};
use trust_engine::{BiasScreener, DecisionEngine, EngineError, Explainer, OutcomeHistory};

fn engine() -> DecisionEngine {
    DecisionEngine::from_config(&EngineConfig::default())
}

fn explainer() -> Explainer {
    Explainer::new(
        engine().registry().clone(),
        BiasConfig::default().protected_attributes,
    )
}

fn persist(id: &str, decision_type: &str, input: Value) -> Decision {
    let result = engine().make_decision(decision_type, &input, "usr-1").unwrap();
    let now = Utc::now();
    Decision {
        id: id.into(),
        user_id: "usr-1".into(),
        decision_type: result.decision_type,
        model_name: result.model_name,
        model_version: result.model_version,
        outcome: result.outcome,
        confidence_score: result.confidence,
        processing_time_ms: result.processing_time_ms,
        input_data: input,
        metadata: result.metadata,
        created_at: now,
        updated_at: now,
    }
}

#[rstest]
#[case("loan_approval", json!({"income": 20000, "requested_amount": 100000, "credit_score": 580}))]
#[case("loan_approval", json!({"income": 150000, "requested_amount": 20000, "credit_score": 820, "existing_debt": 5000, "employment_years": 4}))]
#[case("loan_approval", json!({"income": 50000, "requested_amount": 60000, "credit_score": 690}))]
#[case("fraud_detection", json!({"amount": 0}))]
#[case("fraud_check", json!({"amount": 9000, "avg_transaction_amount": 80, "transactions_last_hour": 30}))]
#[case("personalized_offer", json!({"account_balance": 25000, "tenure_years": 3}))]
#[case("risk_profiling", json!({"age": 45}))]
#[case("risk_profile", json!({"age": 120, "investment_horizon_years": 100, "loss_tolerance": 1}))]
fn valid_payloads_produce_bounded_confidence(#[case] decision_type: &str, #[case] input: Value) {
    let result = engine().make_decision(decision_type, &input, "usr-1").unwrap();
    assert!((0.0..=1.0).contains(&result.confidence), "{result:?}");
    assert!(!result.outcome.is_empty());
}

#[rstest]
#[case("loan_approval", json!({"income": 20000, "requested_amount": 100000}))]
#[case("loan_approval", json!({"income": "lots", "requested_amount": 1, "credit_score": 700}))]
#[case("loan_approval", json!({"income": 1000, "requested_amount": 1, "credit_score": 299}))]
#[case("fraud_detection", json!({"amount": -1}))]
#[case("personalized_offer", json!("not an object"))]
#[case("risk_profiling", json!({"age": 30, "loss_tolerance": 2}))]
fn invalid_payloads_are_validation_errors(#[case] decision_type: &str, #[case] input: Value) {
    let err = engine().make_decision(decision_type, &input, "usr-1").unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
}

#[test]
fn denied_loan_scenario() {
    let decision = persist(
        "dec-scenario",
        "loan_approval",
        json!({"income": 20000, "requested_amount": 100000, "credit_score": 580}),
    );
    assert_eq!(decision.outcome, "denied");
    assert!(decision.confidence_score > 0.5);

    let explanation = explainer().explain(&decision).unwrap();
    assert!(explanation.fairness_metrics.contains_key("overall_accuracy"));

    let history = OutcomeHistory::from_decisions(
        DecisionType::LoanApproval,
        &BiasConfig::default().protected_attributes,
        std::slice::from_ref(&decision),
    );
    let alerts = BiasScreener::new(BiasConfig::default())
        .screen(&decision, Some(&explanation), &history)
        .unwrap();
    // Loan model is accurate and uses no protected features.
    assert!(alerts.is_empty());
}

#[test]
fn deterministic_apart_from_latency() {
    let input = json!({"account_balance": 42000, "tenure_years": 6, "monthly_spend": 900});
    let mut a = engine().make_decision("personalized_offer", &input, "usr-1").unwrap();
    let mut b = engine().make_decision("personalized_offer", &input, "usr-1").unwrap();
    a.processing_time_ms = 0;
    b.processing_time_ms = 0;
    assert_eq!(a, b);
}

#[test]
fn disparate_impact_is_flagged_for_disadvantaged_group() {
    let strong = json!({"income": 150000, "requested_amount": 10000, "credit_score": 820});
    let weak = json!({"income": 20000, "requested_amount": 100000, "credit_score": 580});
    let with_gender = |input: &Value, gender: &str| {
        let mut input = input.clone();
        input["gender"] = json!(gender);
        input
    };

    let mut decisions = Vec::new();
    // Group "a": 5 of 5 approved.
    for i in 0..5 {
        decisions.push(persist(&format!("dec-a{i}"), "loan_approval", with_gender(&strong, "a")));
    }
    // Group "b": 1 of 5 approved.
    decisions.push(persist("dec-b0", "loan_approval", with_gender(&strong, "b")));
    for i in 1..5 {
        decisions.push(persist(&format!("dec-b{i}"), "loan_approval", with_gender(&weak, "b")));
    }

    let config = BiasConfig::default();
    let history = OutcomeHistory::from_decisions(
        DecisionType::LoanApproval,
        &config.protected_attributes,
        &decisions,
    );
    let screener = BiasScreener::new(config);

    let subject = decisions.last().unwrap();
    let alerts = screener.screen(subject, None, &history).unwrap();
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.alert_type, AlertType::DisparateImpact);
    assert_eq!(alert.protected_attribute.as_deref(), Some("gender"));
    assert!((alert.metric_value - 0.2).abs() < 1e-9);
    assert_eq!(alert.severity, Severity::Critical);

    // The advantaged group raises nothing.
    assert!(screener.screen(&decisions[0], None, &history).unwrap().is_empty());

    let summary = screener.fairness_summary(&history);
    assert_eq!(summary.total, 10);
    assert!((summary.favorable_rate - 0.6).abs() < 1e-9);
    assert!((summary.disparate_impact["gender"] - 0.2).abs() < 1e-9);
}

#[test]
fn small_groups_are_not_evaluated() {
    let input = json!({"income": 20000, "requested_amount": 100000, "credit_score": 580, "gender": "b"});
    let decisions = vec![persist("dec-1", "loan_approval", input)];
    let config = BiasConfig::default();
    let history = OutcomeHistory::from_decisions(
        DecisionType::LoanApproval,
        &config.protected_attributes,
        &decisions,
    );
    let alerts = BiasScreener::new(config)
        .screen(&decisions[0], None, &history)
        .unwrap();
    assert!(alerts.is_empty());
}

#[test]
fn risk_profile_raises_influence_and_accuracy_alerts() {
    let decision = persist(
        "dec-risk",
        "risk_profiling",
        json!({"age": 80, "investment_horizon_years": 2, "loss_tolerance": 0.1}),
    );
    let explanation = explainer().explain(&decision).unwrap();
    let config = BiasConfig::default();
    let history = OutcomeHistory::from_decisions(
        DecisionType::RiskProfiling,
        &config.protected_attributes,
        std::slice::from_ref(&decision),
    );
    let alerts = BiasScreener::new(config)
        .screen(&decision, Some(&explanation), &history)
        .unwrap();

    let influence = alerts
        .iter()
        .find(|a| a.alert_type == AlertType::ProtectedFeatureInfluence)
        .unwrap();
    assert_eq!(influence.protected_attribute.as_deref(), Some("age"));
    assert_eq!(influence.severity, Severity::Medium);

    let accuracy = alerts
        .iter()
        .find(|a| a.alert_type == AlertType::AccuracyDegradation)
        .unwrap();
    assert_eq!(accuracy.severity, Severity::Low);
    assert!((accuracy.threshold - 0.80).abs() < 1e-9);
}

#[test]
fn history_must_include_screened_decision() {
    let decision = persist("dec-x", "fraud_detection", json!({"amount": 5}));
    let history = OutcomeHistory::new(DecisionType::FraudDetection, &[]);
    let err = BiasScreener::new(BiasConfig::default())
        .screen(&decision, None, &history)
        .unwrap_err();
    assert!(matches!(err, EngineError::Internal(_)));
}
