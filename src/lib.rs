// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # stackit-webhook - cert-manager DNS-01 solver for STACKIT DNS
//!
//! This crate answers ACME DNS-01 challenges by managing `TXT` record sets in
//! STACKIT DNS on behalf of cert-manager.
//!
//! ## Overview
//!
//! For every challenge the solver:
//!
//! 1. Decodes the Issuer's solver configuration
//! 2. Picks credentials (service-account key, ambient token, or Kubernetes secret)
//! 3. Resolves the authoritative zone
//! 4. Creates, updates or deletes the challenge record set
//!
//! `Present` and `CleanUp` are idempotent and keep no state between calls.
//!
//! ## Modules
//!
//! - [`solver`] - Present/CleanUp reconciliation
//! - [`repository`] - Zone and record-set repositories
//! - [`stackit`] - STACKIT DNS REST client and service-account key flow
//! - [`config`] - Per-challenge configuration loading
//! - [`credentials`] - Credential selection
//! - [`secrets`] - Kubernetes secret lookup
//! - [`webhook`] - cert-manager webhook HTTP server
//!
//! ## Example
//!
//! ```rust,no_run
//! use stackit_webhook::config::DefaultConfigProvider;
//! use stackit_webhook::credentials::AmbientCredentials;
//! use stackit_webhook::repository::{StackitRRSetRepositoryFactory, StackitZoneRepositoryFactory};
//! use stackit_webhook::solver::StackitSolver;
//!
//! let solver = StackitSolver::new(
//!     reqwest::Client::new(),
//!     AmbientCredentials::default(),
//!     Box::new(DefaultConfigProvider::new()),
//!     Box::new(StackitZoneRepositoryFactory),
//!     Box::new(StackitRRSetRepositoryFactory),
//! );
//! ```

pub mod config;
pub mod constants;
pub mod credentials;
pub mod dns_errors;
pub mod http_errors;
pub mod metrics;
pub mod repository;
pub mod secrets;
pub mod solver;
pub mod stackit;
pub mod webhook;

#[cfg(test)]
mod dns_errors_tests;
#[cfg(test)]
mod http_errors_tests;
