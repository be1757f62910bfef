// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end solver tests against a mocked STACKIT DNS API.
//!
//! The solver runs with the real repositories and HTTP client; only the
//! provider is replaced by a `wiremock` server.

mod common;

use common::*;
use serde_json::json;
use stackit_webhook::credentials::AmbientCredentials;
use stackit_webhook::dns_errors::SolverError;
use stackit_webhook::solver::{ChallengeAction, Solver};
use std::path::PathBuf;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_zone(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones")))
        .and(query_param("dnsName[eq]", "example.com"))
        .and(query_param("active[eq]", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zones_body()))
        .mount(server)
        .await;
}

async fn mount_rrsets(server: &MockServer, values: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones/{ZONE_ID}/rrsets")))
        .and(query_param("name[eq]", RRSET_NAME))
        .and(query_param("type[eq]", "TXT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rrsets_body(values)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_present_creates_record_set() {
    let server = MockServer::start().await;
    mount_zone(&server).await;
    mount_rrsets(&server, &[]).await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones/{ZONE_ID}/rrsets")))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "name": RRSET_NAME,
            "type": "TXT",
            "ttl": 600,
            "comment": "This record set is managed by stackit-cert-manager-webhook",
            "records": [{"content": "token-a"}]
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"message": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let solver = solver_for(token_credentials(&server));
    solver
        .present(&challenge(ChallengeAction::Present, "token-a", solver_config(&server)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_present_appends_to_existing_record_set() {
    let server = MockServer::start().await;
    mount_zone(&server).await;
    mount_rrsets(&server, &["token-a"]).await;

    Mock::given(method("PATCH"))
        .and(path(format!(
            "/v1/projects/{PROJECT_ID}/zones/{ZONE_ID}/rrsets/rrset-1"
        )))
        .and(body_json(json!({
            "name": RRSET_NAME,
            "ttl": 60,
            "comment": "This record set is managed by stackit-cert-manager-webhook",
            "records": [{"content": "token-a"}, {"content": "token-b"}]
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"message": "success"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = solver_config(&server);
    config["acmeTxtRecordTTL"] = json!(60);

    let solver = solver_for(token_credentials(&server));
    solver
        .present(&challenge(ChallengeAction::Present, "token-b", config))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_present_fails_without_zone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"zones": []})))
        .mount(&server)
        .await;

    let solver = solver_for(token_credentials(&server));
    let err = solver
        .present(&challenge(ChallengeAction::Present, "token-a", solver_config(&server)))
        .await
        .unwrap_err();

    assert_eq!(err.status_reason(), "ZoneNotFound");
}

#[tokio::test]
async fn test_clean_up_deletes_record_set() {
    let server = MockServer::start().await;
    mount_zone(&server).await;
    mount_rrsets(&server, &["token-a"]).await;

    Mock::given(method("DELETE"))
        .and(path(format!(
            "/v1/projects/{PROJECT_ID}/zones/{ZONE_ID}/rrsets/rrset-1"
        )))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"message": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let solver = solver_for(token_credentials(&server));
    solver
        .clean_up(&challenge(ChallengeAction::CleanUp, "token-a", solver_config(&server)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_clean_up_is_idempotent() {
    let server = MockServer::start().await;
    mount_zone(&server).await;
    mount_rrsets(&server, &[]).await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let solver = solver_for(token_credentials(&server));
    let request = challenge(ChallengeAction::CleanUp, "token-a", solver_config(&server));
    solver.clean_up(&request).await.unwrap();
    solver.clean_up(&request).await.unwrap();
}

#[tokio::test]
async fn test_clean_up_tolerates_concurrent_delete() {
    let server = MockServer::start().await;
    mount_zone(&server).await;
    mount_rrsets(&server, &["token-a"]).await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let solver = solver_for(token_credentials(&server));
    solver
        .clean_up(&challenge(ChallengeAction::CleanUp, "token-a", solver_config(&server)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_clean_up_without_zone_makes_no_record_set_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"zones": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones/{ZONE_ID}/rrsets")))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let solver = solver_for(token_credentials(&server));
    solver
        .clean_up(&challenge(ChallengeAction::CleanUp, "token-a", solver_config(&server)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unauthorized_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "unauthorized"})))
        .mount(&server)
        .await;

    let solver = solver_for(token_credentials(&server));
    let err = solver
        .clean_up(&challenge(ChallengeAction::CleanUp, "token-a", solver_config(&server)))
        .await
        .unwrap_err();

    assert!(matches!(err, SolverError::Zone(_)));
    assert_eq!(err.status_reason(), "ProviderAuthFailed");
}

#[tokio::test]
async fn test_service_account_key_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "sa-access-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones")))
        .and(header("authorization", "Bearer sa-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zones_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT_ID}/zones/{ZONE_ID}/rrsets")))
        .and(header("authorization", "Bearer sa-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rrsets_body(&[])))
        .expect(1)
        .mount(&server)
        .await;

    // The ambient token must lose against the key file
    let ambient = AmbientCredentials {
        auth_token: Some("test-token".into()),
        service_account_key_path: Some(PathBuf::from(SERVICE_ACCOUNT_KEY)),
        service_account_token_url: format!("{}/token", server.uri()),
    };

    let solver = solver_for(ambient);
    solver
        .clean_up(&challenge(ChallengeAction::CleanUp, "token-a", solver_config(&server)))
        .await
        .unwrap();
}
