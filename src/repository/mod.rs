// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone and record-set repositories over the STACKIT DNS API.
//!
//! The reconciliation engine only sees the traits defined here. Each call
//! builds fresh repositories from a [`RepositoryConfig`] through the factory
//! traits, so no client or token outlives a single challenge.

use std::path::PathBuf;

use reqwest::Client as HttpClient;
use tracing::debug;

use crate::dns_errors::CredentialError;
use crate::stackit::{key_flow, StackitDnsClient};

pub mod rrset;
pub mod zone;

pub use rrset::{RRSetRepository, RRSetRepositoryFactory, StackitRRSetRepositoryFactory};
pub use zone::{StackitZoneRepositoryFactory, ZoneRepository, ZoneRepositoryFactory};

#[cfg(test)]
pub use rrset::{MockRRSetRepository, MockRRSetRepositoryFactory};
#[cfg(test)]
pub use zone::{MockZoneRepository, MockZoneRepositoryFactory};

/// How requests against the STACKIT API are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Static bearer token
    BearerToken(String),
    /// Service-account key file, exchanged for an access token per client
    ServiceAccountKey(PathBuf),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            Self::ServiceAccountKey(path) => {
                f.debug_tuple("ServiceAccountKey").field(path).finish()
            }
        }
    }
}

/// Everything needed to build an authenticated STACKIT client.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub api_base_path: String,
    pub project_id: String,
    pub http_client: HttpClient,
    pub service_account_token_url: String,
    pub credential: Credential,
}

impl RepositoryConfig {
    /// Returns true when the service-account key flow is used.
    #[must_use]
    pub fn use_service_account(&self) -> bool {
        matches!(self.credential, Credential::ServiceAccountKey(_))
    }
}

/// Build an authenticated client, running the key flow in service-account mode.
///
/// # Errors
///
/// Returns a [`CredentialError`] if the service-account key cannot be loaded
/// or exchanged for an access token.
pub async fn connect(config: &RepositoryConfig) -> Result<StackitDnsClient, CredentialError> {
    let token = match &config.credential {
        Credential::BearerToken(token) => token.clone(),
        Credential::ServiceAccountKey(path) => {
            debug!(key_path = %path.display(), "Using service account key flow");
            key_flow::fetch_access_token(
                &config.http_client,
                &config.service_account_token_url,
                path,
            )
            .await?
        }
    };

    Ok(StackitDnsClient::new(
        config.http_client.clone(),
        &config.api_base_path,
        config.project_id.clone(),
        token,
    ))
}
