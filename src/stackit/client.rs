// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP client for the STACKIT DNS REST API.
//!
//! Every call is a single attempt. Non-success statuses are turned into an
//! [`ApiError`] whose kind comes from [`crate::http_errors::classify_status`];
//! deciding what a kind means is left to the repositories.

use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use super::types::{
    CreateRecordSetPayload, PartialUpdateRecordSetPayload, RecordSet, RecordSetListResponse,
    Zone, ZoneListResponse,
};
use crate::constants::RRSET_LIST_PAGE_SIZE;
use crate::dns_errors::ApiError;

/// Normalize an API base path: drop trailing slashes.
pub(crate) fn build_api_url(base_path: &str) -> String {
    base_path.trim_end_matches('/').to_string()
}

/// Authenticated client bound to one STACKIT project.
#[derive(Clone)]
pub struct StackitDnsClient {
    http: HttpClient,
    base_url: String,
    project_id: String,
    token: String,
}

impl std::fmt::Debug for StackitDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackitDnsClient")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl StackitDnsClient {
    /// Create a client from a transport handle, base path, project and bearer token.
    pub fn new(
        http: HttpClient,
        base_path: &str,
        project_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: build_api_url(base_path),
            project_id: project_id.into(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn zones_url(&self) -> String {
        format!("{}/v1/projects/{}/zones", self.base_url, self.project_id)
    }

    fn rrsets_url(&self, zone_id: &str) -> String {
        format!("{}/{zone_id}/rrsets", self.zones_url())
    }

    fn rrset_url(&self, zone_id: &str, rrset_id: &str) -> String {
        format!("{}/{rrset_id}", self.rrsets_url(zone_id))
    }

    /// List active zones whose DNS name equals `dns_name`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body cannot be decoded.
    pub async fn list_zones(&self, dns_name: &str) -> Result<Vec<Zone>, ApiError> {
        let url = self.zones_url();
        let query = [("dnsName[eq]", dns_name.to_string()), ("active[eq]", "true".into())];
        let response: ZoneListResponse = self
            .request_json("list_zones", Method::GET, &url, &query, None::<&()>)
            .await?;
        Ok(response.zones)
    }

    /// List active record sets in a zone with exactly this name and type.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body cannot be decoded.
    pub async fn list_record_sets(
        &self,
        zone_id: &str,
        name: &str,
        rrset_type: &str,
    ) -> Result<Vec<RecordSet>, ApiError> {
        let url = self.rrsets_url(zone_id);
        let query = [
            ("page", "1".to_string()),
            ("pageSize", RRSET_LIST_PAGE_SIZE.to_string()),
            ("active[eq]", "true".into()),
            ("name[eq]", name.to_string()),
            ("type[eq]", rrset_type.to_string()),
        ];
        let response: RecordSetListResponse = self
            .request_json("list_rrsets", Method::GET, &url, &query, None::<&()>)
            .await?;
        Ok(response.rr_sets)
    }

    /// Create a record set in a zone.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the provider rejects the request.
    pub async fn create_record_set(
        &self,
        zone_id: &str,
        payload: &CreateRecordSetPayload,
    ) -> Result<(), ApiError> {
        let url = self.rrsets_url(zone_id);
        self.request("create_rrset", Method::POST, &url, &[], Some(payload))
            .await
            .map(drop)
    }

    /// Replace name, TTL, comment and records of an existing record set.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the provider rejects the request.
    pub async fn partial_update_record_set(
        &self,
        zone_id: &str,
        rrset_id: &str,
        payload: &PartialUpdateRecordSetPayload,
    ) -> Result<(), ApiError> {
        let url = self.rrset_url(zone_id, rrset_id);
        self.request("update_rrset", Method::PATCH, &url, &[], Some(payload))
            .await
            .map(drop)
    }

    /// Delete a record set by identifier.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the provider rejects the request.
    pub async fn delete_record_set(&self, zone_id: &str, rrset_id: &str) -> Result<(), ApiError> {
        let url = self.rrset_url(zone_id, rrset_id);
        self.request("delete_rrset", Method::DELETE, &url, &[], None::<&()>)
            .await
            .map(drop)
    }

    async fn request_json<T, B>(
        &self,
        operation: &'static str,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.request(operation, method, url, query, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::transport(operation, url, format!("failed to decode response: {e}"))
        })
    }

    async fn request<B>(
        &self,
        operation: &'static str,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        debug!(operation, method = %method, url = %url, "STACKIT API request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&self.token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(operation, url = %url, error = %e, "STACKIT API request could not be sent");
            ApiError::transport(operation, url, e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::transport(operation, url, format!("failed to read body: {e}")))?;

        if !status.is_success() {
            debug!(
                operation,
                method = %method,
                url = %url,
                status = %status,
                "STACKIT API request failed"
            );
            return Err(ApiError::from_status(operation, url, status.as_u16(), text));
        }

        debug!(
            operation,
            url = %url,
            status = %status,
            response_len = text.len(),
            "STACKIT API request successful"
        );

        Ok(text)
    }
}
