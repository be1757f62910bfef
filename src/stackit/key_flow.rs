// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! STACKIT service-account key flow.
//!
//! A service-account key file holds an RSA private key plus the claims the
//! token endpoint expects. The flow signs a short-lived RS512 assertion with
//! that key and exchanges it for a bearer access token:
//!
//! 1. Read and parse the key file
//! 2. Sign `{iss, sub, aud, jti, iat, exp}` with header `kid`
//! 3. `POST` the assertion to the token endpoint (`jwt-bearer` grant)

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::types::TokenResponse;
use crate::constants::{JWT_BEARER_GRANT_TYPE, SERVICE_ACCOUNT_ASSERTION_LIFETIME_SECS};
use crate::dns_errors::{ApiError, CredentialError};

/// Parsed STACKIT service-account key file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub id: Option<String>,
    pub credentials: ServiceAccountCredentials,
}

/// The `credentials` block of a service-account key file.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountCredentials {
    pub kid: String,
    pub iss: String,
    pub sub: String,
    pub aud: String,
    #[serde(default)]
    pub private_key: Option<String>,
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("kid", &self.kid)
            .field("iss", &self.iss)
            .field("sub", &self.sub)
            .field("aud", &self.aud)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

fn key_error(path: &Path, reason: impl Into<String>) -> CredentialError {
    CredentialError::ServiceAccountKey {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}

/// Read and parse a service-account key file.
///
/// # Errors
///
/// Returns [`CredentialError::ServiceAccountKey`] if the file is unreadable,
/// is not a key document, or carries no private key.
pub async fn load_service_account_key(path: &Path) -> Result<ServiceAccountKey, CredentialError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| key_error(path, format!("failed to read key file: {e}")))?;

    let key: ServiceAccountKey = serde_json::from_str(&raw)
        .map_err(|e| key_error(path, format!("failed to parse key file: {e}")))?;

    if key
        .credentials
        .private_key
        .as_deref()
        .is_none_or(|k| k.trim().is_empty())
    {
        return Err(key_error(path, "key file has no private key"));
    }

    Ok(key)
}

/// Sign the JWT assertion presented to the token endpoint.
///
/// # Errors
///
/// Returns [`CredentialError::ServiceAccountKey`] if the private key is not a
/// valid RSA PEM or signing fails.
pub fn build_assertion(
    key: &ServiceAccountKey,
    key_path: &Path,
    now: DateTime<Utc>,
) -> Result<String, CredentialError> {
    let creds = &key.credentials;
    let pem = creds
        .private_key
        .as_deref()
        .ok_or_else(|| key_error(key_path, "key file has no private key"))?;

    let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| key_error(key_path, format!("invalid private key: {e}")))?;

    let mut header = Header::new(Algorithm::RS512);
    header.kid = Some(creds.kid.clone());

    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: creds.iss.clone(),
        sub: creds.sub.clone(),
        aud: creds.aud.clone(),
        jti: uuid::Uuid::new_v4().to_string(),
        iat,
        exp: iat + SERVICE_ACCOUNT_ASSERTION_LIFETIME_SECS,
    };

    encode(&header, &claims, &encoding_key)
        .map_err(|e| key_error(key_path, format!("failed to sign assertion: {e}")))
}

/// Run the full key flow and return a bearer access token.
///
/// # Errors
///
/// Returns [`CredentialError::ServiceAccountKey`] for key problems and
/// [`CredentialError::TokenExchange`] if the token endpoint rejects the
/// assertion or answers with an unreadable body.
pub async fn fetch_access_token(
    http: &HttpClient,
    token_url: &str,
    key_path: &Path,
) -> Result<String, CredentialError> {
    const OPERATION: &str = "service_account_token";

    let key = load_service_account_key(key_path).await?;
    let assertion = build_assertion(&key, key_path, Utc::now())?;

    debug!(token_url = %token_url, kid = %key.credentials.kid, "Exchanging service account assertion");

    let response = http
        .post(token_url)
        .form(&[("grant_type", JWT_BEARER_GRANT_TYPE), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| ApiError::transport(OPERATION, token_url, e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::transport(OPERATION, token_url, format!("failed to read body: {e}")))?;

    if !status.is_success() {
        return Err(ApiError::from_status(OPERATION, token_url, status.as_u16(), text).into());
    }

    let token: TokenResponse = serde_json::from_str(&text).map_err(|e| {
        ApiError::transport(OPERATION, token_url, format!("failed to decode response: {e}"))
    })?;

    info!(
        expires_in = ?token.expires_in,
        "Obtained access token from service account key"
    );

    Ok(token.access_token)
}
