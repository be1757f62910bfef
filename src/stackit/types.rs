// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! STACKIT DNS API data types.

use serde::{Deserialize, Serialize};

/// A DNS zone hosted in a STACKIT project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub dns_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Response of `GET /v1/projects/{projectId}/zones`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneListResponse {
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

/// A single value inside a record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub content: String,
}

impl Record {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// All records sharing one (name, type) pair in a zone.
///
/// `id` is `None` until the provider has assigned one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub rrset_type: String,
    pub ttl: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl RecordSet {
    /// Record contents in provider order.
    pub fn contents(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.content.as_str())
    }

    /// Returns true if a record with exactly this content is present.
    #[must_use]
    pub fn contains(&self, content: &str) -> bool {
        self.contents().any(|c| c == content)
    }
}

/// Response of `GET /v1/projects/{projectId}/zones/{zoneId}/rrsets`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSetListResponse {
    #[serde(default)]
    pub rr_sets: Vec<RecordSet>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

/// Record value as submitted in create/update payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub content: String,
}

impl From<&Record> for RecordPayload {
    fn from(record: &Record) -> Self {
        Self {
            content: record.content.clone(),
        }
    }
}

/// Body of `POST .../rrsets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordSetPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub rrset_type: String,
    pub ttl: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub records: Vec<RecordPayload>,
}

impl From<&RecordSet> for CreateRecordSetPayload {
    fn from(rrset: &RecordSet) -> Self {
        Self {
            name: rrset.name.clone(),
            rrset_type: rrset.rrset_type.clone(),
            ttl: rrset.ttl,
            comment: rrset.comment.clone(),
            records: rrset.records.iter().map(RecordPayload::from).collect(),
        }
    }
}

/// Body of `PATCH .../rrsets/{rrSetId}`
///
/// The record list always replaces the full value collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialUpdateRecordSetPayload {
    pub name: String,
    pub ttl: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub records: Vec<RecordPayload>,
}

impl From<&RecordSet> for PartialUpdateRecordSetPayload {
    fn from(rrset: &RecordSet) -> Self {
        Self {
            name: rrset.name.clone(),
            ttl: rrset.ttl,
            comment: rrset.comment.clone(),
            records: rrset.records.iter().map(RecordPayload::from).collect(),
        }
    }
}

/// Response of the service-account token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}
