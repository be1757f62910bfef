// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP status code classification for STACKIT API responses.
//!
//! Every non-success response from the STACKIT DNS API is reduced to an
//! [`ApiErrorKind`] here, in one place. The repositories then decide what a
//! given kind means for their operation (for example, a record-set delete
//! treats both `NotFound` and `BadRequest` as "already gone").
//!
//! # Usage
//!
//! ```rust
//! use stackit_webhook::dns_errors::ApiErrorKind;
//! use stackit_webhook::http_errors::{classify_status, map_http_error_to_reason};
//!
//! assert_eq!(classify_status(404), ApiErrorKind::NotFound);
//!
//! let (reason, message) = map_http_error_to_reason(500);
//! assert_eq!(reason, "ProviderError");
//! assert!(message.contains("500"));
//! ```

use crate::dns_errors::ApiErrorKind;

/// Classify an HTTP status code returned by the STACKIT API.
///
/// | HTTP Code | Kind |
/// |-----------|------|
/// | 400 | `BadRequest` |
/// | 401, 403 | `Unauthorized` |
/// | 404 | `NotFound` |
/// | Other | `Unknown` |
#[must_use]
pub const fn classify_status(status_code: u16) -> ApiErrorKind {
    match status_code {
        400 => ApiErrorKind::BadRequest,
        401 | 403 => ApiErrorKind::Unauthorized,
        404 => ApiErrorKind::NotFound,
        _ => ApiErrorKind::Unknown,
    }
}

/// Map HTTP status code to a reason and a human-readable message.
///
/// # Example
///
/// ```rust
/// use stackit_webhook::http_errors::map_http_error_to_reason;
///
/// let (reason, message) = map_http_error_to_reason(403);
/// assert_eq!(reason, "ProviderAuthFailed");
/// assert!(message.contains("403"));
/// ```
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            "ProviderBadRequest",
            "Invalid request to STACKIT DNS API (400)".into(),
        ),
        401 => (
            "ProviderAuthFailed",
            "STACKIT authentication required (401)".into(),
        ),
        403 => (
            "ProviderAuthFailed",
            "STACKIT authorization failed (403)".into(),
        ),
        404 => (
            "ProviderNotFound",
            "Zone or record set not found at STACKIT (404)".into(),
        ),
        502..=504 => (
            "ProviderError",
            format!("STACKIT DNS API gateway error ({status_code})"),
        ),
        _ => (
            "ProviderError",
            format!("Unexpected HTTP error from STACKIT DNS API ({status_code})"),
        ),
    }
}
