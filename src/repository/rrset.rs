// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record-set CRUD scoped to a single zone.

use async_trait::async_trait;
use tracing::debug;

use super::{connect, RepositoryConfig};
use crate::dns_errors::{ApiErrorKind, CredentialError, RecordSetError};
use crate::stackit::types::{CreateRecordSetPayload, PartialUpdateRecordSetPayload};
use crate::stackit::{RecordSet, StackitDnsClient};

/// Record-set operations within one zone. All calls are single attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RRSetRepository: Send + Sync {
    /// Fetch the active record set with exactly this name and type.
    ///
    /// # Errors
    ///
    /// [`RecordSetError::RecordSetNotFound`] when nothing matches.
    async fn fetch_rrset_for_zone(
        &self,
        rrset_name: &str,
        rrset_type: &str,
    ) -> Result<RecordSet, RecordSetError>;

    /// Create a record set. Any `id` on the input is ignored.
    async fn create_rrset(&self, rrset: RecordSet) -> Result<(), RecordSetError>;

    /// Replace comment, name, TTL and all values of an existing record set.
    ///
    /// # Errors
    ///
    /// [`RecordSetError::MissingId`] if `rrset.id` is absent.
    async fn update_rrset(&self, rrset: RecordSet) -> Result<(), RecordSetError>;

    /// Delete a record set by id.
    ///
    /// # Errors
    ///
    /// [`RecordSetError::DeleteNotFound`] if the provider answers 400 or 404.
    async fn delete_rrset(&self, rrset_id: &str) -> Result<(), RecordSetError>;
}

/// Builds an [`RRSetRepository`] for one zone.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RRSetRepositoryFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`CredentialError`] if the client cannot be authenticated.
    async fn new_rrset_repository(
        &self,
        config: &RepositoryConfig,
        zone_id: &str,
    ) -> Result<Box<dyn RRSetRepository>, CredentialError>;
}

/// [`RRSetRepository`] backed by the STACKIT DNS API.
#[derive(Debug, Clone)]
pub struct StackitRRSetRepository {
    client: StackitDnsClient,
    zone_id: String,
}

impl StackitRRSetRepository {
    #[must_use]
    pub fn new(client: StackitDnsClient, zone_id: impl Into<String>) -> Self {
        Self {
            client,
            zone_id: zone_id.into(),
        }
    }
}

#[async_trait]
impl RRSetRepository for StackitRRSetRepository {
    async fn fetch_rrset_for_zone(
        &self,
        rrset_name: &str,
        rrset_type: &str,
    ) -> Result<RecordSet, RecordSetError> {
        let rrsets = self
            .client
            .list_record_sets(&self.zone_id, rrset_name, rrset_type)
            .await?;

        rrsets
            .into_iter()
            .next()
            .ok_or_else(|| RecordSetError::RecordSetNotFound {
                name: rrset_name.to_string(),
                rrset_type: rrset_type.to_string(),
            })
    }

    async fn create_rrset(&self, rrset: RecordSet) -> Result<(), RecordSetError> {
        let payload = CreateRecordSetPayload::from(&rrset);
        self.client
            .create_record_set(&self.zone_id, &payload)
            .await?;
        Ok(())
    }

    async fn update_rrset(&self, rrset: RecordSet) -> Result<(), RecordSetError> {
        let rrset_id = rrset
            .id
            .as_deref()
            .ok_or_else(|| RecordSetError::MissingId {
                name: rrset.name.clone(),
            })?;

        let payload = PartialUpdateRecordSetPayload::from(&rrset);
        self.client
            .partial_update_record_set(&self.zone_id, rrset_id, &payload)
            .await?;
        Ok(())
    }

    async fn delete_rrset(&self, rrset_id: &str) -> Result<(), RecordSetError> {
        match self.client.delete_record_set(&self.zone_id, rrset_id).await {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.kind, ApiErrorKind::NotFound | ApiErrorKind::BadRequest) => {
                debug!(
                    zone_id = %self.zone_id,
                    rrset_id = %rrset_id,
                    status = ?e.status,
                    "Record set already gone"
                );
                Err(RecordSetError::DeleteNotFound {
                    id: rrset_id.to_string(),
                    status: e.status.unwrap_or_default(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Factory producing [`StackitRRSetRepository`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackitRRSetRepositoryFactory;

#[async_trait]
impl RRSetRepositoryFactory for StackitRRSetRepositoryFactory {
    async fn new_rrset_repository(
        &self,
        config: &RepositoryConfig,
        zone_id: &str,
    ) -> Result<Box<dyn RRSetRepository>, CredentialError> {
        let client = connect(config).await?;
        Ok(Box::new(StackitRRSetRepository::new(client, zone_id)))
    }
}
