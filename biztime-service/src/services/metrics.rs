//! Prometheus metrics for biztime-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};
use service_core::middleware::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "biztime_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Invoice paid-state transitions applied by updates.
pub static PAYMENT_TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "biztime_invoice_payment_transitions_total",
        "Invoice payment transitions by kind",
        &["transition"] // paid, unpaid, remains_paid
    )
    .expect("Failed to register invoice_payment_transitions_total")
});

/// Entity mutations by entity and operation.
pub static MUTATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "biztime_mutations_total",
        "Total number of create/update/delete operations",
        &["entity", "operation"]
    )
    .expect("Failed to register mutations_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&HTTP_REQUESTS_TOTAL);
    Lazy::force(&HTTP_REQUEST_DURATION);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&PAYMENT_TRANSITIONS_TOTAL);
    Lazy::force(&MUTATIONS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
