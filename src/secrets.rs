// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes secret lookup for the STACKIT auth token.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

use crate::dns_errors::CredentialError;

/// Reads a single string value out of a Kubernetes secret.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`CredentialError`] if the secret cannot be read or does not
    /// contain `key`.
    async fn string_from_secret(
        &self,
        namespace: &str,
        secret_name: &str,
        key: &str,
    ) -> Result<String, CredentialError>;
}

/// [`SecretFetcher`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretFetcher {
    client: Client,
}

impl KubeSecretFetcher {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretFetcher for KubeSecretFetcher {
    async fn string_from_secret(
        &self,
        namespace: &str,
        secret_name: &str,
        key: &str,
    ) -> Result<String, CredentialError> {
        let secret_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        debug!(namespace = %namespace, secret = %secret_name, "Reading auth token secret");

        let secret = secret_api
            .get(secret_name)
            .await
            .map_err(|e| CredentialError::SecretLookup {
                namespace: namespace.to_string(),
                secret: secret_name.to_string(),
                reason: e.to_string(),
            })?;

        value_from_secret(&secret, namespace, secret_name, key)
    }
}

/// Extract `key` from a secret's `data` as UTF-8.
///
/// # Errors
///
/// [`CredentialError::KeyNotFound`] if the key is absent,
/// [`CredentialError::InvalidSecretData`] if the value is not UTF-8.
pub fn value_from_secret(
    secret: &Secret,
    namespace: &str,
    secret_name: &str,
    key: &str,
) -> Result<String, CredentialError> {
    let value = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .ok_or_else(|| CredentialError::KeyNotFound {
            namespace: namespace.to_string(),
            secret: secret_name.to_string(),
            key: key.to_string(),
        })?;

    String::from_utf8(value.0.clone()).map_err(|_| CredentialError::InvalidSecretData {
        namespace: namespace.to_string(),
        secret: secret_name.to_string(),
        key: key.to_string(),
    })
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod secrets_tests;
