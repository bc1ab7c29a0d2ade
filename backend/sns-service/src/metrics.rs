//! Prometheus metrics for sns-service.
//!
//! Exposes request, toggle and upload collectors and the `/metrics` handler.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sns_http_requests_total",
        "HTTP requests segmented by method, route and status",
        &["method", "route", "status"]
    )
    .expect("failed to register sns_http_requests_total");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "sns_http_request_duration_seconds",
        "HTTP request latency segmented by method and route",
        &["method", "route"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("failed to register sns_http_request_duration_seconds");

    /// Like/follow toggles by relation, action and outcome.
    pub static ref TOGGLE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sns_toggle_total",
        "Relation toggles segmented by relation, action and outcome",
        &["relation", "action", "outcome"]
    )
    .expect("failed to register sns_toggle_total");

    /// Image uploads by outcome (stored, rejected, failed, cleaned_up).
    pub static ref UPLOAD_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sns_upload_total",
        "Image uploads segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register sns_upload_total");
}

pub fn record_toggle(relation: &str, action: &str, outcome: &str) {
    TOGGLE_TOTAL
        .with_label_values(&[relation, action, outcome])
        .inc();
}

pub fn record_upload(outcome: &str) {
    UPLOAD_TOTAL.with_label_values(&[outcome]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
