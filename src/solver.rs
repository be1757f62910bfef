// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS-01 challenge reconciliation against STACKIT DNS.
//!
//! [`StackitSolver`] keeps the TXT record set at a challenge FQDN in the state
//! cert-manager asks for:
//!
//! - **Present** resolves the zone, then creates the record set with the
//!   challenge key, or appends the key to the existing set and refreshes its
//!   TTL. A key that is already present is not duplicated.
//! - **CleanUp** resolves the zone and deletes the whole record set. A missing
//!   zone, missing record set or a provider "already gone" answer all count as
//!   success.
//!
//! Both actions are safe to repeat. Nothing is cached between calls: every
//! call loads its configuration, picks credentials and builds fresh
//! repositories.
//!
//! The solver has a two-phase lifecycle. [`StackitSolver::new`] only stores
//! collaborators; [`Solver::initialize`] connects to Kubernetes so the auth
//! token secret can be read.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::ConfigProvider;
use crate::constants::{RRSET_MANAGED_COMMENT, SOLVER_NAME, TXT_RECORD_TYPE};
use crate::credentials::{resolve_credentials, AmbientCredentials};
use crate::dns_errors::{RecordSetError, SolverError, ZoneError};
use crate::http_errors::map_http_error_to_reason;
use crate::metrics;
use crate::repository::{RRSetRepository, RRSetRepositoryFactory, ZoneRepositoryFactory};
use crate::secrets::{KubeSecretFetcher, SecretFetcher};
use crate::stackit::{Record, RecordSet};

/// Which side of the challenge lifecycle a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    Present,
    CleanUp,
}

impl ChallengeAction {
    /// Metrics label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::CleanUp => "cleanup",
        }
    }
}

/// A single challenge as sent by cert-manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub uid: String,
    pub action: ChallengeAction,
    #[serde(rename = "type", default)]
    pub challenge_type: String,
    #[serde(default)]
    pub dns_name: String,
    /// Value to publish in the TXT record
    pub key: String,
    #[serde(default)]
    pub resource_namespace: String,
    /// Record name, fully qualified with trailing dot
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    /// Authoritative zone, possibly with trailing dot
    pub resolved_zone: String,
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    /// Solver configuration from the Issuer, passed through undecoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// A DNS-01 solver as hosted by the webhook server.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Name under which the solver is referenced on an Issuer.
    fn name(&self) -> &str;

    /// Publish the challenge key.
    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError>;

    /// Retire the challenge record.
    async fn clean_up(&self, request: &ChallengeRequest) -> Result<(), SolverError>;

    /// Connect to the cluster. Called once before any challenge is served.
    async fn initialize(&mut self, kube_config: kube::Config) -> Result<(), SolverError>;
}

/// Zone DNS name without trailing dot, and the record set name as given.
#[must_use]
pub fn zone_and_rrset_name(request: &ChallengeRequest) -> (String, String) {
    let zone = request
        .resolved_zone
        .strip_suffix('.')
        .unwrap_or(&request.resolved_zone);
    (zone.to_string(), request.resolved_fqdn.clone())
}

/// Append `key` unless a record with exactly that content already exists.
///
/// Returns true if the record set changed.
pub fn merge_challenge_key(rrset: &mut RecordSet, key: &str) -> bool {
    if rrset.contains(key) {
        return false;
    }
    rrset.records.push(Record::new(key));
    true
}

/// New TXT record set holding a single challenge key.
#[must_use]
pub fn new_challenge_rrset(name: &str, key: &str, ttl: i64) -> RecordSet {
    RecordSet {
        id: None,
        name: name.to_string(),
        rrset_type: TXT_RECORD_TYPE.to_string(),
        ttl,
        comment: Some(RRSET_MANAGED_COMMENT.to_string()),
        records: vec![Record::new(key)],
        active: None,
    }
}

/// Everything a challenge needs once zone and credentials are resolved.
struct ChallengeContext {
    rrset_repository: Box<dyn RRSetRepository>,
    rrset_name: String,
    ttl: i64,
}

/// STACKIT DNS implementation of [`Solver`].
pub struct StackitSolver {
    http_client: HttpClient,
    ambient: AmbientCredentials,
    config_provider: Box<dyn ConfigProvider>,
    zone_repository_factory: Box<dyn ZoneRepositoryFactory>,
    rrset_repository_factory: Box<dyn RRSetRepositoryFactory>,
    secret_fetcher: Option<Arc<dyn SecretFetcher>>,
}

impl std::fmt::Debug for StackitSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackitSolver")
            .field("ambient", &self.ambient)
            .field("initialized", &self.secret_fetcher.is_some())
            .finish_non_exhaustive()
    }
}

impl StackitSolver {
    /// Create an uninitialized solver. No I/O happens here.
    #[must_use]
    pub fn new(
        http_client: HttpClient,
        ambient: AmbientCredentials,
        config_provider: Box<dyn ConfigProvider>,
        zone_repository_factory: Box<dyn ZoneRepositoryFactory>,
        rrset_repository_factory: Box<dyn RRSetRepositoryFactory>,
    ) -> Self {
        Self {
            http_client,
            ambient,
            config_provider,
            zone_repository_factory,
            rrset_repository_factory,
            secret_fetcher: None,
        }
    }

    /// Use `fetcher` for auth token lookups instead of connecting in [`Solver::initialize`].
    #[must_use]
    pub fn with_secret_fetcher(mut self, fetcher: Arc<dyn SecretFetcher>) -> Self {
        self.secret_fetcher = Some(fetcher);
        self
    }

    async fn resolve_context(
        &self,
        request: &ChallengeRequest,
    ) -> Result<ChallengeContext, SolverError> {
        let cfg = self
            .config_provider
            .load_config(request.config.as_ref())
            .await?;

        let repository_config = resolve_credentials(
            &cfg,
            &self.ambient,
            self.secret_fetcher.as_deref(),
            &self.http_client,
        )
        .await?;

        let (zone_dns_name, rrset_name) = zone_and_rrset_name(request);

        let zone_repository = self
            .zone_repository_factory
            .new_zone_repository(&repository_config)
            .await
            .inspect_err(|e| error!(error = %e, "Error creating zone repository"))?;

        info!(zone_dns_name = %zone_dns_name, "Fetching zone");

        let zone = zone_repository
            .fetch_zone(&zone_dns_name)
            .await
            .inspect_err(|e| match e {
                ZoneError::ZoneNotFound { .. } => {
                    warn!(zone_dns_name = %zone_dns_name, "Zone not found");
                }
                ZoneError::Api(_) => {
                    error!(zone_dns_name = %zone_dns_name, error = %e, "Error fetching zone");
                }
            })?;

        info!(zone_dns_name = %zone_dns_name, zone_id = %zone.id, "Zone fetched");

        let rrset_repository = self
            .rrset_repository_factory
            .new_rrset_repository(&repository_config, &zone.id)
            .await
            .inspect_err(|e| error!(error = %e, "Error creating rrset repository"))?;

        Ok(ChallengeContext {
            rrset_repository,
            rrset_name,
            ttl: cfg.acme_txt_record_ttl,
        })
    }

    async fn present_inner(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        let ctx = self.resolve_context(request).await?;

        match ctx
            .rrset_repository
            .fetch_rrset_for_zone(&ctx.rrset_name, TXT_RECORD_TYPE)
            .await
        {
            Ok(rrset) => self.update_existing_rrset(&ctx, rrset, &request.key).await,
            Err(e) if e.is_not_found() => self.create_rrset(&ctx, &request.key).await,
            Err(e) => {
                error!(rrset_name = %ctx.rrset_name, error = %e, "Error fetching rrset");
                Err(e.into())
            }
        }
    }

    async fn create_rrset(&self, ctx: &ChallengeContext, key: &str) -> Result<(), SolverError> {
        info!(rrset_name = %ctx.rrset_name, "RRSet not found, creating new RRSet");

        let rrset = new_challenge_rrset(&ctx.rrset_name, key, ctx.ttl);
        ctx.rrset_repository
            .create_rrset(rrset)
            .await
            .inspect_err(|e| {
                error!(rrset_name = %ctx.rrset_name, error = %e, "Error creating rrset");
            })?;

        metrics::record_rrset_operation("create");
        info!(rrset_name = %ctx.rrset_name, ttl = ctx.ttl, "RRSet created");
        Ok(())
    }

    async fn update_existing_rrset(
        &self,
        ctx: &ChallengeContext,
        mut rrset: RecordSet,
        key: &str,
    ) -> Result<(), SolverError> {
        let appended = merge_challenge_key(&mut rrset, key);
        rrset.ttl = ctx.ttl;

        info!(
            rrset_name = %ctx.rrset_name,
            rrset_id = ?rrset.id,
            appended,
            values = rrset.records.len(),
            "RRSet found, updating RRSet"
        );

        ctx.rrset_repository
            .update_rrset(rrset)
            .await
            .inspect_err(|e| {
                error!(rrset_name = %ctx.rrset_name, error = %e, "Error updating rrset");
            })?;

        metrics::record_rrset_operation("update");
        info!(rrset_name = %ctx.rrset_name, "RRSet updated");
        Ok(())
    }

    async fn clean_up_inner(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        let ctx = match self.resolve_context(request).await {
            Ok(ctx) => ctx,
            Err(SolverError::Zone(ZoneError::ZoneNotFound { zone })) => {
                info!(zone_dns_name = %zone, "Zone not found, nothing to clean up");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        info!(rrset_name = %ctx.rrset_name, "Cleaning up RRSet");

        let rrset = match ctx
            .rrset_repository
            .fetch_rrset_for_zone(&ctx.rrset_name, TXT_RECORD_TYPE)
            .await
        {
            Ok(rrset) => rrset,
            Err(e) if e.is_not_found() => {
                info!(rrset_name = %ctx.rrset_name, "RRSet not found, nothing to clean up");
                return Ok(());
            }
            Err(e) => {
                error!(rrset_name = %ctx.rrset_name, error = %e, "Error fetching rrset");
                return Err(e.into());
            }
        };

        let rrset_id = rrset.id.ok_or_else(|| RecordSetError::MissingId {
            name: ctx.rrset_name.clone(),
        })?;

        match ctx.rrset_repository.delete_rrset(&rrset_id).await {
            Ok(()) => {
                metrics::record_rrset_operation("delete");
                info!(rrset_name = %ctx.rrset_name, rrset_id = %rrset_id, "RRSet deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!(
                    rrset_name = %ctx.rrset_name,
                    rrset_id = %rrset_id,
                    "RRSet not found, nothing to clean up"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    rrset_name = %ctx.rrset_name,
                    rrset_id = %rrset_id,
                    error = %e,
                    "Error deleting rrset"
                );
                Err(e.into())
            }
        }
    }
}

/// Record the outcome of a challenge action.
fn observe(action: ChallengeAction, started: Instant, result: &Result<(), SolverError>) {
    match result {
        Ok(()) => metrics::record_challenge_success(action.as_str(), started.elapsed()),
        Err(e) => {
            let provider_status = match e {
                SolverError::Zone(ZoneError::Api(api))
                | SolverError::RecordSet(RecordSetError::Api(api)) => api.status,
                _ => None,
            };
            if let Some(status) = provider_status {
                let (reason, message) = map_http_error_to_reason(status);
                warn!(action = action.as_str(), reason, "{message}");
            }
            metrics::record_challenge_error(action.as_str(), e.status_reason(), started.elapsed());
        }
    }
}

#[async_trait]
impl Solver for StackitSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        let started = Instant::now();
        let result = self.present_inner(request).await;
        observe(ChallengeAction::Present, started, &result);
        result
    }

    async fn clean_up(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        let started = Instant::now();
        let result = self.clean_up_inner(request).await;
        observe(ChallengeAction::CleanUp, started, &result);
        result
    }

    async fn initialize(&mut self, kube_config: kube::Config) -> Result<(), SolverError> {
        info!("Initializing stackit solver");

        let client = kube::Client::try_from(kube_config).map_err(|e| {
            error!(error = %e, "Error initializing kubernetes client");
            SolverError::Initialization(e.to_string())
        })?;

        self.secret_fetcher = Some(Arc::new(KubeSecretFetcher::new(client)));

        info!("Stackit solver initialized");
        Ok(())
    }
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod solver_tests;
