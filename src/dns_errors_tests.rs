// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for dns_errors module

#[cfg(test)]
mod tests {
    use crate::dns_errors::*;
    use std::path::PathBuf;

    // ============================================================================
    // ApiError
    // ============================================================================

    #[test]
    fn test_api_error_from_status_classifies() {
        let err = ApiError::from_status("delete_rrset", "http://x/rrsets/1", 404, "gone");
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn test_api_error_display_contains_context() {
        let err = ApiError::from_status("list_zones", "http://x/v1/projects/p/zones", 500, "boom");
        let msg = err.to_string();
        assert!(msg.contains("list_zones"));
        assert!(msg.contains("http://x/v1/projects/p/zones"));
        assert!(msg.contains("HTTP 500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_api_error_transport_has_no_status() {
        let err = ApiError::transport("create_rrset", "http://x", "connection refused");
        assert_eq!(err.kind, ApiErrorKind::Transport);
        assert_eq!(err.status, None);
        assert!(!err.to_string().contains("HTTP"));
    }

    // ============================================================================
    // Not-found predicates
    // ============================================================================

    #[test]
    fn test_zone_error_not_found() {
        let err = ZoneError::ZoneNotFound {
            zone: "example.com".into(),
        };
        assert!(err.is_not_found());

        let err = ZoneError::Api(ApiError::from_status("list_zones", "u", 404, ""));
        assert!(
            !err.is_not_found(),
            "an HTTP 404 on the zone list endpoint is a transport problem, not an absent zone"
        );
    }

    #[test]
    fn test_record_set_error_not_found() {
        assert!(RecordSetError::RecordSetNotFound {
            name: "_acme-challenge.example.com.".into(),
            rrset_type: "TXT".into(),
        }
        .is_not_found());
        assert!(RecordSetError::DeleteNotFound {
            id: "1".into(),
            status: 400,
        }
        .is_not_found());
        assert!(!RecordSetError::MissingId { name: "x".into() }.is_not_found());
        assert!(
            !RecordSetError::Api(ApiError::transport("fetch_rrset", "u", "reset")).is_not_found()
        );
    }

    // ============================================================================
    // Messages
    // ============================================================================

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::MissingConfig.to_string(),
            "no configuration provided"
        );
        assert_eq!(
            ConfigError::MissingField { field: "projectId" }.to_string(),
            "projectId must be specified"
        );
        let err = ConfigError::EmptyNamespace {
            path: PathBuf::from("/tmp/ns"),
        };
        assert!(err.to_string().contains("/tmp/ns"));
    }

    #[test]
    fn test_credential_error_messages() {
        let err = CredentialError::KeyNotFound {
            namespace: "cert-manager".into(),
            secret: "stackit".into(),
            key: "auth-token".into(),
        };
        assert_eq!(
            err.to_string(),
            "key 'auth-token' not found in secret 'cert-manager/stackit'"
        );
    }

    // ============================================================================
    // Status reasons
    // ============================================================================

    #[test]
    fn test_status_reason_config() {
        assert_eq!(
            SolverError::from(ConfigError::MissingConfig).status_reason(),
            "MissingConfig"
        );
        assert_eq!(
            SolverError::from(ConfigError::MissingField { field: "projectId" }).status_reason(),
            "MissingConfigField"
        );
    }

    #[test]
    fn test_status_reason_zone() {
        let err = SolverError::from(ZoneError::ZoneNotFound {
            zone: "example.com".into(),
        });
        assert_eq!(err.status_reason(), "ZoneNotFound");
    }

    #[test]
    fn test_status_reason_api_kinds() {
        let cases = [
            (400, "ProviderBadRequest"),
            (401, "ProviderAuthFailed"),
            (404, "ProviderNotFound"),
            (500, "ProviderError"),
        ];
        for (status, expected) in cases {
            let err = SolverError::from(RecordSetError::Api(ApiError::from_status(
                "update_rrset",
                "u",
                status,
                "",
            )));
            assert_eq!(err.status_reason(), expected, "status {status}");
        }

        let err = SolverError::from(ZoneError::Api(ApiError::transport("list_zones", "u", "x")));
        assert_eq!(err.status_reason(), "ProviderUnreachable");
    }

    #[test]
    fn test_status_reason_credentials() {
        assert_eq!(
            SolverError::from(CredentialError::NotInitialized).status_reason(),
            "NotInitialized"
        );
        assert_eq!(
            SolverError::from(CredentialError::TokenExchange(ApiError::from_status(
                "token",
                "u",
                401,
                ""
            )))
            .status_reason(),
            "TokenExchangeFailed"
        );
    }
}
