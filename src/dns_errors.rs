// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS operation and HTTP API error types for the STACKIT webhook.
//!
//! This module provides specialized error types for:
//! - STACKIT DNS API calls (zones and record sets)
//! - Solver configuration decoding and validation
//! - Credential resolution (Kubernetes secrets, service-account keys)
//!
//! Provider responses are classified once, by HTTP status code, into an
//! [`ApiErrorKind`]. Callers branch on the kind (or on the typed not-found
//! variants) and never on response body text.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Classification of a failed STACKIT API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// HTTP 404
    NotFound,
    /// HTTP 400
    BadRequest,
    /// HTTP 401 or 403
    Unauthorized,
    /// The request never produced a usable response (connection, timeout, decode)
    Transport,
    /// Any other non-success status
    Unknown,
}

impl ApiErrorKind {
    /// Stable lowercase name, suitable for log fields and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Transport => "transport",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call against the STACKIT DNS (or service-account) API.
///
/// Carries the operation and endpoint so the host can log which call failed
/// without the engine adding context at every call site.
#[derive(Error, Debug, Clone)]
#[error("STACKIT API {operation} {endpoint} failed ({kind}{}): {message}", status_suffix(.status))]
pub struct ApiError {
    /// Classified failure kind
    pub kind: ApiErrorKind,
    /// Logical operation, e.g. `list_zones`
    pub operation: &'static str,
    /// Request URL
    pub endpoint: String,
    /// HTTP status code, when a response was received
    pub status: Option<u16>,
    /// Response body or transport error message
    pub message: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(", HTTP {s}")).unwrap_or_default()
}

impl ApiError {
    /// Build an error from a non-success HTTP status.
    #[must_use]
    pub fn from_status(
        operation: &'static str,
        endpoint: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: crate::http_errors::classify_status(status),
            operation,
            endpoint: endpoint.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build an error for a request that failed before or after the status line.
    #[must_use]
    pub fn transport(
        operation: &'static str,
        endpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            operation,
            endpoint: endpoint.into(),
            status: None,
            message: message.into(),
        }
    }
}

/// Errors returned by the zone resolver.
#[derive(Error, Debug, Clone)]
pub enum ZoneError {
    /// No active zone with this DNS name exists in the project
    #[error("zone '{zone}' not found")]
    ZoneNotFound {
        /// The zone DNS name that was looked up
        zone: String,
    },

    /// The zone lookup itself failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ZoneError {
    /// Returns true if the zone does not exist at the provider.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ZoneNotFound { .. })
    }
}

/// Errors returned by the record-set repository.
#[derive(Error, Debug, Clone)]
pub enum RecordSetError {
    /// No active record set with this name and type exists in the zone
    #[error("rrset '{name}' of type {rrset_type} not found")]
    RecordSetNotFound {
        /// The record set name
        name: String,
        /// The record set type
        rrset_type: String,
    },

    /// The provider answered a delete with 400 or 404
    #[error("rrset '{id}' not found (HTTP {status})")]
    DeleteNotFound {
        /// The record set identifier
        id: String,
        /// The status the provider returned
        status: u16,
    },

    /// An update or delete was attempted on a record set that was never fetched
    #[error("rrset '{name}' has no identifier")]
    MissingId {
        /// The record set name
        name: String,
    },

    /// Any other provider failure
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl RecordSetError {
    /// Returns true if the record set is absent, either on fetch or on delete.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RecordSetNotFound { .. } | Self::DeleteNotFound { .. }
        )
    }
}

/// Errors raised while loading the per-challenge solver configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The challenge request carried no configuration at all
    #[error("no configuration provided")]
    MissingConfig,

    /// The configuration was not a valid solver configuration object
    #[error("error decoding solver configuration: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required field was empty or absent
    #[error("{field} must be specified")]
    MissingField {
        /// JSON name of the missing field
        field: &'static str,
    },

    /// The namespace file could not be read
    #[error("failed to find the webhook pod namespace in {}: {source}", .path.display())]
    NamespaceFile {
        /// The namespace file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The namespace file was readable but empty
    #[error("invalid webhook pod namespace provided in {}", .path.display())]
    EmptyNamespace {
        /// The namespace file path
        path: PathBuf,
    },
}

/// Errors raised while resolving credentials for the STACKIT API.
#[derive(Error, Debug, Clone)]
pub enum CredentialError {
    /// The Kubernetes secret could not be read
    #[error("failed to read secret '{namespace}/{secret}': {reason}")]
    SecretLookup {
        /// Secret namespace
        namespace: String,
        /// Secret name
        secret: String,
        /// Underlying error message
        reason: String,
    },

    /// The secret exists but does not contain the requested key
    #[error("key '{key}' not found in secret '{namespace}/{secret}'")]
    KeyNotFound {
        /// Secret namespace
        namespace: String,
        /// Secret name
        secret: String,
        /// Requested key
        key: String,
    },

    /// The secret value is not valid UTF-8
    #[error("key '{key}' in secret '{namespace}/{secret}' is not valid UTF-8")]
    InvalidSecretData {
        /// Secret namespace
        namespace: String,
        /// Secret name
        secret: String,
        /// Requested key
        key: String,
    },

    /// A secret lookup was attempted before the solver was initialized
    #[error("secret fetcher not initialized")]
    NotInitialized,

    /// The service-account key file is unreadable or malformed
    #[error("invalid service account key {}: {reason}", .path.display())]
    ServiceAccountKey {
        /// Key file path
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// The service-account token exchange failed
    #[error("service account token exchange failed: {0}")]
    TokenExchange(#[from] ApiError),
}

/// Composite error returned by `Present`, `CleanUp` and `Initialize`.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Credential error
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Zone resolution error
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// Record set error
    #[error(transparent)]
    RecordSet(#[from] RecordSetError),

    /// The solver could not be activated
    #[error("failed to initialize solver: {0}")]
    Initialization(String),
}

impl SolverError {
    /// Returns a stable CamelCase reason for this error.
    ///
    /// Used in webhook responses and as a metrics label.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::MissingConfig) => "MissingConfig",
            Self::Config(ConfigError::Decode(_)) => "InvalidConfig",
            Self::Config(ConfigError::MissingField { .. }) => "MissingConfigField",
            Self::Config(ConfigError::NamespaceFile { .. } | ConfigError::EmptyNamespace { .. }) => {
                "NamespaceUnavailable"
            }

            Self::Credential(CredentialError::SecretLookup { .. }) => "SecretLookupFailed",
            Self::Credential(CredentialError::KeyNotFound { .. }) => "SecretKeyNotFound",
            Self::Credential(CredentialError::InvalidSecretData { .. }) => "InvalidSecretData",
            Self::Credential(CredentialError::NotInitialized) => "NotInitialized",
            Self::Credential(CredentialError::ServiceAccountKey { .. }) => {
                "InvalidServiceAccountKey"
            }
            Self::Credential(CredentialError::TokenExchange(_)) => "TokenExchangeFailed",

            Self::Zone(ZoneError::ZoneNotFound { .. }) => "ZoneNotFound",
            Self::Zone(ZoneError::Api(e)) | Self::RecordSet(RecordSetError::Api(e)) => {
                api_reason(e.kind)
            }

            Self::RecordSet(RecordSetError::RecordSetNotFound { .. }) => "RecordSetNotFound",
            Self::RecordSet(RecordSetError::DeleteNotFound { .. }) => "RecordSetNotFound",
            Self::RecordSet(RecordSetError::MissingId { .. }) => "RecordSetMissingId",

            Self::Initialization(_) => "InitializationFailed",
        }
    }
}

fn api_reason(kind: ApiErrorKind) -> &'static str {
    match kind {
        ApiErrorKind::NotFound => "ProviderNotFound",
        ApiErrorKind::BadRequest => "ProviderBadRequest",
        ApiErrorKind::Unauthorized => "ProviderAuthFailed",
        ApiErrorKind::Transport => "ProviderUnreachable",
        ApiErrorKind::Unknown => "ProviderError",
    }
}
