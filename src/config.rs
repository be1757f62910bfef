// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-challenge solver configuration.
//!
//! Each challenge carries an opaque JSON object taken from the Issuer's
//! webhook `config` block. It is decoded into a [`ProviderConfig`], checked
//! for a project id, completed with defaults, and the secret namespace is
//! filled from the pod's service-account namespace file when not given.
//!
//! # Example
//!
//! ```json
//! {
//!   "projectId": "0b3bd3e4-6d0c-4a8d-9c54-1d4e0c6a3c11",
//!   "authTokenSecretRef": "stackit-cert-manager-webhook",
//!   "acmeTxtRecordTTL": 60
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::constants::{
    DEFAULT_ACME_TXT_RECORD_TTL_SECS, DEFAULT_API_BASE_PATH, DEFAULT_AUTH_TOKEN_SECRET_KEY,
    DEFAULT_AUTH_TOKEN_SECRET_REF, DEFAULT_NAMESPACE_FILE,
};
use crate::dns_errors::ConfigError;

/// Decoded and defaulted solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// STACKIT project that owns the zones. Required.
    #[serde(deserialize_with = "null_as_default")]
    pub project_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub api_base_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub auth_token_secret_ref: String,
    #[serde(deserialize_with = "null_as_default")]
    pub auth_token_secret_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub auth_token_secret_namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_key_path: Option<PathBuf>,
    /// TTL in seconds for challenge record sets. `0` means the default.
    #[serde(rename = "acmeTxtRecordTTL", deserialize_with = "null_as_default")]
    pub acme_txt_record_ttl: i64,
}

/// Decode JSON `null` as the field's zero value, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Source of [`ProviderConfig`] values.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Decode, validate and complete a challenge configuration blob.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the blob is absent, undecodable, lacks a
    /// project id, or no namespace can be determined.
    async fn load_config(
        &self,
        config: Option<&serde_json::Value>,
    ) -> Result<ProviderConfig, ConfigError>;
}

/// [`ConfigProvider`] that reads the namespace fallback from a file.
#[derive(Debug, Clone)]
pub struct DefaultConfigProvider {
    namespace_file: PathBuf,
}

impl Default for DefaultConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultConfigProvider {
    /// Provider using the in-cluster service-account namespace file.
    #[must_use]
    pub fn new() -> Self {
        Self::with_namespace_file(DEFAULT_NAMESPACE_FILE)
    }

    #[must_use]
    pub fn with_namespace_file(path: impl Into<PathBuf>) -> Self {
        Self {
            namespace_file: path.into(),
        }
    }
}

#[async_trait]
impl ConfigProvider for DefaultConfigProvider {
    async fn load_config(
        &self,
        config: Option<&serde_json::Value>,
    ) -> Result<ProviderConfig, ConfigError> {
        let raw = match config {
            None | Some(serde_json::Value::Null) => return Err(ConfigError::MissingConfig),
            Some(raw) => raw,
        };

        let mut cfg = ProviderConfig::deserialize(raw)?;

        if cfg.project_id.is_empty() {
            return Err(ConfigError::MissingField { field: "projectId" });
        }

        set_defaults(&mut cfg);

        cfg.auth_token_secret_namespace =
            determine_namespace(&cfg.auth_token_secret_namespace, &self.namespace_file).await?;

        debug!(
            project_id = %cfg.project_id,
            api_base_path = %cfg.api_base_path,
            namespace = %cfg.auth_token_secret_namespace,
            "Loaded solver configuration"
        );

        Ok(cfg)
    }
}

/// Fill empty fields with their defaults.
pub fn set_defaults(cfg: &mut ProviderConfig) {
    if cfg.api_base_path.is_empty() {
        cfg.api_base_path = DEFAULT_API_BASE_PATH.to_string();
    }
    if cfg.auth_token_secret_ref.is_empty() {
        cfg.auth_token_secret_ref = DEFAULT_AUTH_TOKEN_SECRET_REF.to_string();
    }
    if cfg.auth_token_secret_key.is_empty() {
        cfg.auth_token_secret_key = DEFAULT_AUTH_TOKEN_SECRET_KEY.to_string();
    }
    if cfg.acme_txt_record_ttl == 0 {
        cfg.acme_txt_record_ttl = DEFAULT_ACME_TXT_RECORD_TTL_SECS;
    }
    if cfg
        .service_account_key_path
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        cfg.service_account_key_path = None;
    }
}

/// Return `current` if set, else the trimmed contents of `namespace_file`.
///
/// # Errors
///
/// [`ConfigError::NamespaceFile`] if the file cannot be read,
/// [`ConfigError::EmptyNamespace`] if it only holds whitespace.
pub async fn determine_namespace(
    current: &str,
    namespace_file: &Path,
) -> Result<String, ConfigError> {
    if !current.is_empty() {
        return Ok(current.to_string());
    }

    let data = tokio::fs::read_to_string(namespace_file)
        .await
        .map_err(|source| ConfigError::NamespaceFile {
            path: namespace_file.to_path_buf(),
            source,
        })?;

    let namespace = data.trim();
    if namespace.is_empty() {
        return Err(ConfigError::EmptyNamespace {
            path: namespace_file.to_path_buf(),
        });
    }

    Ok(namespace.to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
