// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the STACKIT webhook.
//!
//! All metrics carry the namespace prefix `stackit_webhook_`.
//!
//! # Metrics Categories
//!
//! - **Challenge Metrics** - Present/CleanUp outcomes and duration
//! - **Record Set Metrics** - Provider-side writes
//! - **Error Metrics** - Failures by action and reason
//!
//! # Example
//!
//! ```rust,no_run
//! use stackit_webhook::metrics::record_challenge_success;
//!
//! record_challenge_success("present", std::time::Duration::from_millis(250));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all webhook metrics
const METRICS_NAMESPACE: &str = "stackit_webhook";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Challenge Metrics
// ============================================================================

/// Total number of challenge actions by action and status
///
/// Labels:
/// - `action`: `present` or `cleanup`
/// - `status`: `success` or `error`
pub static CHALLENGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_challenges_total"),
        "Total number of challenge actions by action and status",
    );
    let counter = CounterVec::new(opts, &["action", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of challenge actions in seconds
///
/// Labels:
/// - `action`: `present` or `cleanup`
pub static CHALLENGE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_challenge_duration_seconds"),
        "Duration of challenge actions in seconds by action",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["action"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Record Set Metrics
// ============================================================================

/// Total number of record set writes at the provider
///
/// Labels:
/// - `operation`: `create`, `update` or `delete`
pub static RECORD_SETS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_record_sets_total"),
        "Total number of record set writes by operation",
    );
    let counter = CounterVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of failed challenge actions by reason
///
/// Labels:
/// - `action`: `present` or `cleanup`
/// - `reason`: stable error reason, e.g. `ZoneNotFound`
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of failed challenge actions by action and reason",
    );
    let counter = CounterVec::new(opts, &["action", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful challenge action
pub fn record_challenge_success(action: &str, duration: Duration) {
    CHALLENGES_TOTAL
        .with_label_values(&[action, "success"])
        .inc();
    CHALLENGE_DURATION_SECONDS
        .with_label_values(&[action])
        .observe(duration.as_secs_f64());
}

/// Record a failed challenge action
///
/// # Arguments
/// * `action` - `present` or `cleanup`
/// * `reason` - Stable error reason
/// * `duration` - Time spent before the failure
pub fn record_challenge_error(action: &str, reason: &str, duration: Duration) {
    CHALLENGES_TOTAL
        .with_label_values(&[action, "error"])
        .inc();
    CHALLENGE_DURATION_SECONDS
        .with_label_values(&[action])
        .observe(duration.as_secs_f64());
    ERRORS_TOTAL.with_label_values(&[action, reason]).inc();
}

/// Record a record set write
pub fn record_rrset_operation(operation: &str) {
    RECORD_SETS_TOTAL.with_label_values(&[operation]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_challenge_success() {
        let action = "present_test";
        record_challenge_success(action, Duration::from_millis(500));

        let counter = CHALLENGES_TOTAL.with_label_values(&[action, "success"]);
        assert!(counter.get() > 0.0);

        let histogram = CHALLENGE_DURATION_SECONDS.with_label_values(&[action]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_challenge_error() {
        let action = "cleanup_test";
        record_challenge_error(action, "ZoneNotFound", Duration::from_millis(250));

        let counter = CHALLENGES_TOTAL.with_label_values(&[action, "error"]);
        assert!(counter.get() > 0.0);

        let errors = ERRORS_TOTAL.with_label_values(&[action, "ZoneNotFound"]);
        assert!(errors.get() > 0.0);
    }

    #[test]
    fn test_record_rrset_operation() {
        record_rrset_operation("create_test");
        assert!(RECORD_SETS_TOTAL.with_label_values(&["create_test"]).get() > 0.0);
    }

    #[test]
    fn test_gather_metrics() {
        record_challenge_success("gather_test", Duration::from_millis(100));

        let metrics_text = gather_metrics().unwrap();
        assert!(
            metrics_text.contains("stackit_webhook"),
            "Metrics should contain namespace prefix"
        );
        assert!(
            metrics_text.contains("challenges_total"),
            "Metrics should contain challenge counter"
        );
    }
}
