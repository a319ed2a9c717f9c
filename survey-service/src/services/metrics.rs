//! Prometheus metrics for survey-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};

/// Counter for business operations by outcome.
pub static SURVEY_OPERATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "survey_operations_total",
        "Total number of survey operations",
        &["operation", "outcome"]
    )
    .expect("Failed to register SURVEY_OPERATIONS")
});

/// Counter for assessment set lookups against assessment-service.
pub static SET_LOOKUPS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "survey_set_lookups_total",
        "Total number of assessment set lookups",
        &["outcome"]
    )
    .expect("Failed to register SET_LOOKUPS")
});

/// Counter for invitee emails added to surveys.
pub static EMAILS_ADDED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "survey_emails_added_total",
        "Total number of emails added to surveys"
    )
    .expect("Failed to register EMAILS_ADDED")
});

/// Histogram for database query duration by operation.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "survey_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&SURVEY_OPERATIONS);
    Lazy::force(&SET_LOOKUPS);
    Lazy::force(&EMAILS_ADDED);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Get all metrics as Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_operation(operation: &str, outcome: &str) {
    SURVEY_OPERATIONS
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn record_set_lookup(outcome: &str) {
    SET_LOOKUPS.with_label_values(&[outcome]).inc();
}

pub fn record_emails_added(count: usize) {
    EMAILS_ADDED.inc_by(count as f64);
}
