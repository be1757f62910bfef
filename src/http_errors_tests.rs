// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for http_errors module
//!
//! These tests verify HTTP status classification and reason mapping.

#[cfg(test)]
mod tests {
    use crate::dns_errors::ApiErrorKind;
    use crate::http_errors::*;

    // ============================================================================
    // Test Status Classification
    // ============================================================================

    #[test]
    fn test_classify_400_bad_request() {
        assert_eq!(classify_status(400), ApiErrorKind::BadRequest);
    }

    #[test]
    fn test_classify_401_and_403_unauthorized() {
        assert_eq!(classify_status(401), ApiErrorKind::Unauthorized);
        assert_eq!(classify_status(403), ApiErrorKind::Unauthorized);
    }

    #[test]
    fn test_classify_404_not_found() {
        assert_eq!(classify_status(404), ApiErrorKind::NotFound);
    }

    #[test]
    fn test_classify_5xx_unknown() {
        for code in [500, 502, 503, 504] {
            assert_eq!(classify_status(code), ApiErrorKind::Unknown, "code {code}");
        }
    }

    #[test]
    fn test_classify_never_yields_transport() {
        // Transport is reserved for failures without a status line
        for code in 100..600 {
            assert_ne!(classify_status(code), ApiErrorKind::Transport);
        }
    }

    // ============================================================================
    // Test Reason Mapping
    // ============================================================================

    #[test]
    fn test_map_http_400_bad_request() {
        let (reason, message) = map_http_error_to_reason(400);
        assert_eq!(reason, "ProviderBadRequest");
        assert!(message.contains("400"));
        assert!(message.contains("Invalid request"));
    }

    #[test]
    fn test_map_http_401_unauthorized() {
        let (reason, message) = map_http_error_to_reason(401);
        assert_eq!(reason, "ProviderAuthFailed");
        assert!(message.contains("authentication"));
    }

    #[test]
    fn test_map_http_403_forbidden() {
        let (reason, message) = map_http_error_to_reason(403);
        assert_eq!(reason, "ProviderAuthFailed");
        assert!(message.contains("authorization"));
    }

    #[test]
    fn test_map_http_404_not_found() {
        let (reason, message) = map_http_error_to_reason(404);
        assert_eq!(reason, "ProviderNotFound");
        assert!(message.contains("not found"));
    }

    #[test]
    fn test_map_http_503_gateway() {
        let (reason, message) = map_http_error_to_reason(503);
        assert_eq!(reason, "ProviderError");
        assert!(message.contains("gateway"));
        assert!(message.contains("503"));
    }

    #[test]
    fn test_map_http_unknown_code() {
        let (reason, message) = map_http_error_to_reason(418);
        assert_eq!(reason, "ProviderError");
        assert!(message.contains("418"));
        assert!(message.contains("Unexpected"));
    }
}
