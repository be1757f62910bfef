// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the STACKIT webhook.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Solver Identity
// ============================================================================

/// Name under which this solver is referenced on an ACME Issuer
pub const SOLVER_NAME: &str = "stackit";

/// Comment attached to every record set created by the solver
pub const RRSET_MANAGED_COMMENT: &str = "This record set is managed by stackit-cert-manager-webhook";

/// Record type used for DNS-01 challenges
pub const TXT_RECORD_TYPE: &str = "TXT";

// ============================================================================
// Provider Configuration Defaults
// ============================================================================

/// Default STACKIT DNS API base path
pub const DEFAULT_API_BASE_PATH: &str = "https://dns.api.stackit.cloud";

/// Default name of the Kubernetes secret holding the auth token
pub const DEFAULT_AUTH_TOKEN_SECRET_REF: &str = "stackit-cert-manager-webhook";

/// Default key inside the auth token secret
pub const DEFAULT_AUTH_TOKEN_SECRET_KEY: &str = "auth-token";

/// Default TTL (seconds) for challenge TXT record sets
pub const DEFAULT_ACME_TXT_RECORD_TTL_SECS: i64 = 600;

/// File containing the namespace of the running pod
pub const DEFAULT_NAMESPACE_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

// ============================================================================
// Ambient Environment
// ============================================================================

/// Environment variable carrying an ambient bearer token
pub const ENV_AUTH_TOKEN: &str = "STACKIT_AUTH_TOKEN";

/// Environment variable carrying an ambient service-account key path
pub const ENV_SERVICE_ACCOUNT_KEY_PATH: &str = "STACKIT_SERVICE_ACCOUNT_KEY_PATH";

/// Environment variable overriding the service-account token endpoint
pub const ENV_SERVICE_ACCOUNT_TOKEN_URL: &str = "STACKIT_SERVICE_ACCOUNT_TOKEN_URL";

/// Environment variable carrying the webhook API group name
pub const ENV_GROUP_NAME: &str = "GROUP_NAME";

// ============================================================================
// STACKIT API Constants
// ============================================================================

/// Token endpoint used by the service-account key flow
pub const DEFAULT_SERVICE_ACCOUNT_TOKEN_URL: &str = "https://service-account.api.stackit.cloud/token";

/// OAuth grant type for exchanging a signed JWT assertion
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the self-signed service-account assertion (seconds)
pub const SERVICE_ACCOUNT_ASSERTION_LIFETIME_SECS: i64 = 600;

/// Page size used when listing record sets
pub const RRSET_LIST_PAGE_SIZE: u32 = 10_000;

// ============================================================================
// Webhook Server Constants
// ============================================================================

/// API version of the cert-manager webhook payload
pub const WEBHOOK_API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";

/// Kind of the cert-manager webhook payload
pub const WEBHOOK_PAYLOAD_KIND: &str = "ChallengePayload";

/// Version segment of the aggregated API path served by the webhook
pub const WEBHOOK_RESOURCE_VERSION: &str = "v1alpha1";

/// Default listen address of the webhook server
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8443";
