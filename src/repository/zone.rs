// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone lookup by DNS name.

use async_trait::async_trait;
use tracing::debug;

use super::{connect, RepositoryConfig};
use crate::dns_errors::{CredentialError, ZoneError};
use crate::stackit::{StackitDnsClient, Zone};

/// Resolves a zone DNS name to the provider's zone.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Fetch the active zone whose DNS name equals `zone_dns_name`.
    ///
    /// The name is lowercased and must not carry a trailing dot.
    ///
    /// # Errors
    ///
    /// [`ZoneError::ZoneNotFound`] if no active zone matches, otherwise
    /// [`ZoneError::Api`] for provider failures.
    async fn fetch_zone(&self, zone_dns_name: &str) -> Result<Zone, ZoneError>;
}

/// Builds a [`ZoneRepository`] for one challenge.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneRepositoryFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`CredentialError`] if the client cannot be authenticated.
    async fn new_zone_repository(
        &self,
        config: &RepositoryConfig,
    ) -> Result<Box<dyn ZoneRepository>, CredentialError>;
}

/// [`ZoneRepository`] backed by the STACKIT DNS API.
#[derive(Debug, Clone)]
pub struct StackitZoneRepository {
    client: StackitDnsClient,
}

impl StackitZoneRepository {
    #[must_use]
    pub fn new(client: StackitDnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ZoneRepository for StackitZoneRepository {
    async fn fetch_zone(&self, zone_dns_name: &str) -> Result<Zone, ZoneError> {
        let dns_name = zone_dns_name.to_lowercase();
        let zones = self.client.list_zones(&dns_name).await?;

        if zones.len() > 1 {
            debug!(
                zone_dns_name = %dns_name,
                matches = zones.len(),
                "Multiple zones matched, using the first"
            );
        }

        zones
            .into_iter()
            .next()
            .ok_or(ZoneError::ZoneNotFound { zone: dns_name })
    }
}

/// Factory producing [`StackitZoneRepository`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackitZoneRepositoryFactory;

#[async_trait]
impl ZoneRepositoryFactory for StackitZoneRepositoryFactory {
    async fn new_zone_repository(
        &self,
        config: &RepositoryConfig,
    ) -> Result<Box<dyn ZoneRepository>, CredentialError> {
        let client = connect(config).await?;
        Ok(Box::new(StackitZoneRepository::new(client)))
    }
}
