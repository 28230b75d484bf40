//! Shared test utilities for trust-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use serde_json::{Value, json};
    use trust_config::TrustConfig;
    use trust_core::entities::Decision;
    use trust_core::identity::{Actor, Caller, RequestOrigin, Role};
    use trust_engine::{DecisionEngine, Explainer, ModelRegistry};

    use crate::TrustDb;
    use crate::repos::decision::NewDecision;
    use crate::service::TrustService;

    /// In-memory service with default configuration.
    pub async fn test_service() -> TrustService {
        TrustService::open_in_memory(TrustConfig::default())
            .await
            .unwrap()
    }

    /// In-memory service whose explainer knows no models, so every eager
    /// explanation fails while decisions still succeed.
    pub async fn unexplainable_service() -> TrustService {
        let config = TrustConfig::default();
        let db = TrustDb::open_local(trust_config::IN_MEMORY).await.unwrap();
        let engine = DecisionEngine::from_config(&config.engine);
        let explainer = Explainer::new(
            ModelRegistry::default(),
            config.bias.protected_attributes.clone(),
        );
        TrustService::from_parts(db, config, engine, explainer)
    }

    /// In-memory service with consent enforcement switched on.
    pub async fn consent_enforcing_service() -> TrustService {
        let mut config = TrustConfig::default();
        config.governance.require_consent = true;
        TrustService::open_in_memory(config).await.unwrap()
    }

    pub fn loan_input(income: i64, requested_amount: i64, credit_score: i64) -> Value {
        json!({
            "income": income,
            "requested_amount": requested_amount,
            "credit_score": credit_score,
        })
    }

    /// Insert and commit a denied loan decision for `user_id`, bypassing the
    /// pipeline.
    pub async fn seed_decision(svc: &TrustService, user_id: &str) -> Decision {
        let input = loan_input(20_000, 100_000, 580);
        let result = svc
            .engine()
            .make_decision("loan_approval", &input, user_id)
            .unwrap();
        let tx = svc.db().begin().await.unwrap();
        let decision = svc
            .create_decision(&tx, NewDecision::from_result(user_id, input, result))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        decision
    }

    pub fn officer() -> Caller {
        Caller::new(
            Some(Actor::new("usr-officer", Role::ComplianceOfficer)),
            RequestOrigin {
                ip_address: Some("10.0.0.1".into()),
                user_agent: Some("trust-db-tests".into()),
            },
        )
    }

    pub fn customer(user_id: &str) -> Caller {
        Caller::new(Some(Actor::new(user_id, Role::Customer)), RequestOrigin::default())
    }
}
