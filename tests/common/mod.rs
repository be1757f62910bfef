// Common test utilities for integration tests

#![allow(dead_code)]

use serde_json::json;
use stackit_webhook::config::DefaultConfigProvider;
use stackit_webhook::credentials::AmbientCredentials;
use stackit_webhook::repository::{StackitRRSetRepositoryFactory, StackitZoneRepositoryFactory};
use stackit_webhook::solver::{ChallengeAction, ChallengeRequest, StackitSolver};
use wiremock::MockServer;

pub const PROJECT_ID: &str = "1234";
pub const ZONE_ID: &str = "zone-1";
pub const RRSET_NAME: &str = "_acme-challenge.example.com.";

pub const SERVICE_ACCOUNT_KEY: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/service-account-key.json");

/// Solver wired to the real STACKIT repositories
pub fn solver_for(ambient: AmbientCredentials) -> StackitSolver {
    StackitSolver::new(
        reqwest::Client::new(),
        ambient,
        Box::new(DefaultConfigProvider::with_namespace_file("/nonexistent/namespace")),
        Box::new(StackitZoneRepositoryFactory),
        Box::new(StackitRRSetRepositoryFactory),
    )
}

/// Ambient credentials using a static bearer token
pub fn token_credentials(server: &MockServer) -> AmbientCredentials {
    AmbientCredentials {
        auth_token: Some("test-token".into()),
        service_account_key_path: None,
        service_account_token_url: format!("{}/token", server.uri()),
    }
}

/// Solver configuration as it would appear on an Issuer
pub fn solver_config(server: &MockServer) -> serde_json::Value {
    json!({
        "projectId": PROJECT_ID,
        "apiBasePath": server.uri(),
        "authTokenSecretNamespace": "cert-manager"
    })
}

pub fn challenge(action: ChallengeAction, key: &str, config: serde_json::Value) -> ChallengeRequest {
    ChallengeRequest {
        uid: "a1b2c3".into(),
        action,
        challenge_type: "dns-01".into(),
        dns_name: "example.com".into(),
        key: key.into(),
        resource_namespace: "default".into(),
        resolved_fqdn: RRSET_NAME.into(),
        resolved_zone: "Example.com.".into(),
        allow_ambient_credentials: false,
        config: Some(config),
    }
}

pub fn zones_body() -> serde_json::Value {
    json!({
        "message": "success",
        "totalItems": 1,
        "zones": [{"id": ZONE_ID, "dnsName": "example.com", "active": true}]
    })
}

pub fn rrsets_body(values: &[&str]) -> serde_json::Value {
    if values.is_empty() {
        return json!({"rrSets": [], "totalItems": 0});
    }
    let records: Vec<_> = values.iter().map(|v| json!({"content": v})).collect();
    json!({
        "rrSets": [{
            "id": "rrset-1",
            "name": RRSET_NAME,
            "type": "TXT",
            "ttl": 3600,
            "comment": "This record set is managed by stackit-cert-manager-webhook",
            "records": records,
            "active": true
        }],
        "totalItems": 1
    })
}
