// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! STACKIT DNS API access.
//!
//! - [`client`] - authenticated REST client for zones and record sets
//! - [`key_flow`] - service-account key to access token exchange
//! - [`types`] - wire types

pub mod client;
pub mod key_flow;
pub mod types;

pub use client::StackitDnsClient;
pub use types::{Record, RecordSet, Zone};
