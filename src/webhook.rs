// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP front end speaking the cert-manager external webhook protocol.
//!
//! cert-manager reaches the webhook through the Kubernetes aggregation layer
//! and `POST`s a `ChallengePayload` to
//! `/apis/{group}/v1alpha1/{solver}`. The request's `action` selects
//! `Present` or `CleanUp`; the answer is the same payload with `response`
//! filled in. Solver failures are reported inside `response`, not through the
//! HTTP status.
//!
//! Also served:
//!
//! - `GET /apis/{group}/v1alpha1` - `APIResourceList` discovery document
//! - `GET /healthz` - liveness
//! - `GET /metrics` - Prometheus text format
//!
//! TLS is terminated in front of this server.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::constants::{WEBHOOK_API_VERSION, WEBHOOK_PAYLOAD_KIND, WEBHOOK_RESOURCE_VERSION};
use crate::metrics::gather_metrics;
use crate::solver::{ChallengeAction, ChallengeRequest, Solver};

/// Envelope exchanged with cert-manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

/// Outcome of a challenge action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
}

/// Failure details, shaped like a Kubernetes `Status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStatus {
    pub message: String,
    pub reason: String,
}

impl ChallengeResponse {
    fn success(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            success: true,
            status: None,
        }
    }

    fn failure(uid: &str, reason: &str, message: String) -> Self {
        Self {
            uid: uid.to_string(),
            success: false,
            status: Some(ResponseStatus {
                message,
                reason: reason.to_string(),
            }),
        }
    }
}

/// Request-level errors. These never reach a solver.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("unknown API group '{0}'")]
    UnknownGroup(String),

    #[error("no solver named '{0}'")]
    UnknownSolver(String),

    #[error("challenge payload has no request")]
    MissingRequest,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::UnknownGroup(_) | Self::UnknownSolver(_) => StatusCode::NOT_FOUND,
            Self::MissingRequest => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Shared state of the webhook server.
#[derive(Clone)]
pub struct WebhookState {
    group_name: String,
    solvers: Arc<HashMap<String, Arc<dyn Solver>>>,
}

impl WebhookState {
    /// Serve `solvers` under API group `group_name`, keyed by [`Solver::name`].
    pub fn new(group_name: impl Into<String>, solvers: Vec<Arc<dyn Solver>>) -> Self {
        let solvers = solvers
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();
        Self {
            group_name: group_name.into(),
            solvers: Arc::new(solvers),
        }
    }

    fn check_group(&self, group: &str) -> Result<(), WebhookError> {
        if group == self.group_name {
            Ok(())
        } else {
            Err(WebhookError::UnknownGroup(group.to_string()))
        }
    }
}

/// Build the webhook router.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .route(
            &format!("/apis/{{group}}/{WEBHOOK_RESOURCE_VERSION}"),
            get(discovery),
        )
        .route(
            &format!("/apis/{{group}}/{WEBHOOK_RESOURCE_VERSION}/{{solver}}"),
            post(solve),
        )
        .with_state(state)
}

/// Liveness probe
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Prometheus metrics
pub async fn metrics() -> impl IntoResponse {
    match gather_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Discovery document listing one resource per solver.
pub async fn discovery(
    State(state): State<WebhookState>,
    Path(group): Path<String>,
) -> Result<Json<APIResourceList>, WebhookError> {
    state.check_group(&group)?;

    let mut names: Vec<&String> = state.solvers.keys().collect();
    names.sort();

    let resources = names
        .into_iter()
        .map(|name| APIResource {
            name: name.clone(),
            singular_name: name.clone(),
            namespaced: false,
            kind: WEBHOOK_PAYLOAD_KIND.to_string(),
            verbs: vec!["create".to_string()],
            group: Some(group.clone()),
            version: Some(WEBHOOK_RESOURCE_VERSION.to_string()),
            ..Default::default()
        })
        .collect();

    Ok(Json(APIResourceList {
        group_version: format!("{group}/{WEBHOOK_RESOURCE_VERSION}"),
        resources,
    }))
}

/// Run `Present` or `CleanUp` on the named solver.
pub async fn solve(
    State(state): State<WebhookState>,
    Path((group, solver_name)): Path<(String, String)>,
    Json(payload): Json<ChallengePayload>,
) -> Result<Json<ChallengePayload>, WebhookError> {
    state.check_group(&group)?;

    let solver = state
        .solvers
        .get(&solver_name)
        .ok_or_else(|| WebhookError::UnknownSolver(solver_name.clone()))?;

    let request = payload.request.ok_or(WebhookError::MissingRequest)?;

    info!(
        uid = %request.uid,
        action = ?request.action,
        solver = %solver_name,
        fqdn = %request.resolved_fqdn,
        "Received challenge"
    );

    let result = match request.action {
        ChallengeAction::Present => solver.present(&request).await,
        ChallengeAction::CleanUp => solver.clean_up(&request).await,
    };

    let response = match result {
        Ok(()) => ChallengeResponse::success(&request.uid),
        Err(e) => {
            error!(
                uid = %request.uid,
                action = ?request.action,
                reason = e.status_reason(),
                error = %e,
                "Challenge failed"
            );
            ChallengeResponse::failure(&request.uid, e.status_reason(), e.to_string())
        }
    };

    Ok(Json(ChallengePayload {
        api_version: if payload.api_version.is_empty() {
            WEBHOOK_API_VERSION.to_string()
        } else {
            payload.api_version
        },
        kind: WEBHOOK_PAYLOAD_KIND.to_string(),
        request: Some(request),
        response: Some(response),
    }))
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod webhook_tests;
