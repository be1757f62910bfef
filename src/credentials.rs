// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential selection for STACKIT API calls.
//!
//! Precedence, first match wins:
//!
//! 1. A service-account key path, from the challenge configuration or else the
//!    process-wide default
//! 2. The process-wide bearer token
//! 3. The bearer token stored in the configured Kubernetes secret
//!
//! A failing secret lookup is returned as-is. There is no fallback to an
//! unauthenticated client.

use std::path::PathBuf;

use reqwest::Client as HttpClient;
use tracing::info;

use crate::config::ProviderConfig;
use crate::constants::DEFAULT_SERVICE_ACCOUNT_TOKEN_URL;
use crate::dns_errors::CredentialError;
use crate::repository::{Credential, RepositoryConfig};
use crate::secrets::SecretFetcher;

/// Process-wide credential defaults, read once at startup.
#[derive(Clone, Default)]
pub struct AmbientCredentials {
    pub auth_token: Option<String>,
    pub service_account_key_path: Option<PathBuf>,
    /// Token endpoint of the service-account key flow. Empty means the default.
    pub service_account_token_url: String,
}

impl std::fmt::Debug for AmbientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientCredentials")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("service_account_key_path", &self.service_account_key_path)
            .field("service_account_token_url", &self.service_account_token_url)
            .finish()
    }
}

impl AmbientCredentials {
    fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref().filter(|t| !t.is_empty())
    }

    fn service_account_key_path(&self) -> Option<&PathBuf> {
        self.service_account_key_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    fn token_url(&self) -> String {
        if self.service_account_token_url.is_empty() {
            DEFAULT_SERVICE_ACCOUNT_TOKEN_URL.to_string()
        } else {
            self.service_account_token_url.clone()
        }
    }
}

/// Build the [`RepositoryConfig`] for one challenge.
///
/// `secrets` is `None` until the solver has been initialized; reaching the
/// secret lookup in that state yields [`CredentialError::NotInitialized`].
///
/// # Errors
///
/// Propagates any [`CredentialError`] from the secret lookup.
pub async fn resolve_credentials(
    cfg: &ProviderConfig,
    ambient: &AmbientCredentials,
    secrets: Option<&dyn SecretFetcher>,
    http_client: &HttpClient,
) -> Result<RepositoryConfig, CredentialError> {
    let key_path = cfg
        .service_account_key_path
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| ambient.service_account_key_path());

    let credential = if let Some(path) = key_path {
        info!(key_path = %path.display(), "Using service account key for authentication");
        Credential::ServiceAccountKey(path.clone())
    } else if let Some(token) = ambient.auth_token() {
        info!("Using ambient auth token for authentication");
        Credential::BearerToken(token.to_string())
    } else {
        let fetcher = secrets.ok_or(CredentialError::NotInitialized)?;
        let token = fetcher
            .string_from_secret(
                &cfg.auth_token_secret_namespace,
                &cfg.auth_token_secret_ref,
                &cfg.auth_token_secret_key,
            )
            .await?;
        info!(
            namespace = %cfg.auth_token_secret_namespace,
            secret = %cfg.auth_token_secret_ref,
            "Using auth token from secret for authentication"
        );
        Credential::BearerToken(token)
    };

    Ok(RepositoryConfig {
        api_base_path: cfg.api_base_path.clone(),
        project_id: cfg.project_id.clone(),
        http_client: http_client.clone(),
        service_account_token_url: ambient.token_url(),
        credential,
    })
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
