//! Audit trail integration tests:
//! - Entries are immutable (re-reads are identical, UPDATE/DELETE rejected)
//! - Filters and newest-first ordering
//! - Export bundle contents
//! - Appends from a second store wait out the first store's write lock

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use trust_config::TrustConfig;
use trust_core::enums::{AuditAction, AuditStatus, ResourceType, RiskLevel};
use trust_core::identity::{Actor, Caller, RequestOrigin, Role};
use trust_db::TrustService;
use trust_db::governance::{OverrideRequest, SimulateRequest};
use trust_db::repos::audit::{AuditFilter, AuditRecord};

async fn service() -> TrustService {
    TrustService::open_in_memory(TrustConfig::default())
        .await
        .unwrap()
}

fn officer() -> Caller {
    Caller::new(
        Some(Actor::new("usr-olga", Role::ComplianceOfficer)),
        RequestOrigin::default(),
    )
}

#[tokio::test]
async fn entries_read_back_identically() {
    let svc = service().await;
    svc.record_audit(
        AuditRecord::new(AuditAction::Login, &officer())
            .resource(ResourceType::User, "usr-olga")
            .details(&json!({"method": "password"})),
    )
    .await;

    let listed = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    let first = svc.get_audit_log(&listed[0].id).await.unwrap().unwrap();
    let second = svc.get_audit_log(&listed[0].id).await.unwrap().unwrap();
    assert_eq!(first, listed[0]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn storage_rejects_rewrites() {
    let svc = service().await;
    svc.record_audit(AuditRecord::new(AuditAction::Logout, &officer()))
        .await;
    let entry = svc.query_audit_logs(&AuditFilter::default()).await.unwrap().remove(0);

    let tx = svc.db().begin().await.unwrap();
    let update = tx
        .execute(
            "UPDATE audit_logs SET status = 'failure' WHERE id = ?1",
            [entry.id.as_str()],
        )
        .await;
    assert!(update.is_err());
    let delete = tx
        .execute("DELETE FROM audit_logs WHERE id = ?1", [entry.id.as_str()])
        .await;
    assert!(delete.is_err());
    tx.rollback().await.unwrap();

    assert_eq!(svc.get_audit_log(&entry.id).await.unwrap(), Some(entry));
}

#[tokio::test]
async fn filters_select_by_action_status_and_risk() {
    let svc = service().await;
    let customer = Caller::new(Some(Actor::new("usr-alice", Role::Customer)), RequestOrigin::default());

    let outcome = svc
        .simulate_decision(
            &customer,
            SimulateRequest {
                decision_type: "loan_approval".into(),
                subject_user_id: None,
                input: json!({"income": 20000, "requested_amount": 100_000, "credit_score": 580}),
            },
        )
        .await
        .unwrap();
    svc.override_decision(
        &officer(),
        OverrideRequest {
            decision_id: outcome.decision.id.clone(),
            new_outcome: "approved".into(),
            reason: "manual review passed".into(),
            risk_level: RiskLevel::High,
            reviewer_notes: None,
        },
    )
    .await
    .unwrap();
    let _ = svc
        .override_decision(
            &officer(),
            OverrideRequest {
                decision_id: "dec-00000000".into(),
                new_outcome: "approved".into(),
                reason: "typo".into(),
                risk_level: RiskLevel::Low,
                reviewer_notes: None,
            },
        )
        .await;

    let all = svc.query_audit_logs(&AuditFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].status, AuditStatus::Failure);
    assert_eq!(all[2].action_type, AuditAction::AiDecision);

    let failures = svc
        .query_audit_logs(&AuditFilter {
            status: Some(AuditStatus::Failure),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].resource_id.as_deref(), Some("dec-00000000"));

    let high = svc
        .query_audit_logs(&AuditFilter {
            risk_level: Some(RiskLevel::High),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].action_type, AuditAction::DecisionOverride);

    let about_decision = svc
        .query_audit_logs(&AuditFilter {
            resource_id: Some(outcome.decision.id.clone()),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(about_decision.len(), 2);

    let limited = svc
        .query_audit_logs(&AuditFilter {
            limit: Some(1),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(limited, vec![all[0].clone()]);
}

#[tokio::test]
async fn export_bundle_carries_overrides_and_alerts() {
    let svc = service().await;
    let customer = Caller::new(Some(Actor::new("usr-alice", Role::Customer)), RequestOrigin::default());
    let outcome = svc
        .simulate_decision(
            &customer,
            SimulateRequest {
                decision_type: "risk_profiling".into(),
                subject_user_id: None,
                input: json!({"age": 30, "investment_horizon_years": 10, "loss_tolerance": 0.6}),
            },
        )
        .await
        .unwrap();
    svc.override_decision(
        &officer(),
        OverrideRequest {
            decision_id: outcome.decision.id.clone(),
            new_outcome: "conservative".into(),
            reason: "client request".into(),
            risk_level: RiskLevel::Low,
            reviewer_notes: None,
        },
    )
    .await
    .unwrap();

    let bundle = svc.export_snapshot(&officer()).await.unwrap();
    assert_eq!(bundle.decisions.len(), 1);
    assert_eq!(bundle.decisions[0].outcome, "conservative");
    assert_eq!(bundle.overrides.len(), 1);
    assert_eq!(bundle.bias_alerts.len(), outcome.bias_alerts.len());
    assert!(!bundle.bias_alerts.is_empty());
    assert_eq!(bundle.audit_logs.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn append_waits_for_another_stores_write_lock() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TrustConfig::default();
    config.database.path = dir.path().join("trustai.db").to_string_lossy().into_owned();

    let first = TrustService::open(config.clone()).await.unwrap();
    let second = Arc::new(TrustService::open(config).await.unwrap());

    let held = first.db().begin().await.unwrap();
    let writer = {
        let second = Arc::clone(&second);
        tokio::spawn(async move {
            second
                .record_audit(
                    AuditRecord::new(AuditAction::Login, &officer())
                        .resource(ResourceType::User, "usr-olga"),
                )
                .await;
        })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;
    held.commit().await.unwrap();
    writer.await.unwrap();

    let from_second = second.query_audit_logs(&AuditFilter::default()).await.unwrap();
    assert_eq!(from_second.len(), 1);
    assert_eq!(from_second[0].action_type, AuditAction::Login);
    let from_first = first.query_audit_logs(&AuditFilter::default()).await.unwrap();
    assert_eq!(from_first, from_second);
}
