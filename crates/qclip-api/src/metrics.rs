//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "qclip_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "qclip_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "qclip_http_requests_in_flight";

    // Pipeline metrics
    pub const PIPELINE_RUNS_TOTAL: &str = "qclip_pipeline_runs_total";
    pub const PIPELINE_DURATION_SECONDS: &str = "qclip_pipeline_duration_seconds";
    pub const STAGE_DURATION_SECONDS: &str = "qclip_stage_duration_seconds";
    pub const FFMPEG_DURATION_SECONDS: &str = "qclip_ffmpeg_duration_seconds";
    pub const FONT_FALLBACK_RENDERS_TOTAL: &str = "qclip_font_fallback_renders_total";
    pub const OUTPUT_BYTES: &str = "qclip_output_bytes";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a finished pipeline run; `outcome` is `success` or an error kind.
pub fn record_pipeline_run(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::PIPELINE_RUNS_TOTAL, &labels).increment(1);
    histogram!(names::PIPELINE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record how long one pipeline stage took.
pub fn record_stage_duration(stage: &str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record FFmpeg processing duration.
pub fn record_ffmpeg_duration(duration_secs: f64) {
    histogram!(names::FFMPEG_DURATION_SECONDS).record(duration_secs);
}

/// Record a render that used the built-in font.
pub fn record_font_fallback() {
    counter!(names::FONT_FALLBACK_RENDERS_TOTAL).increment(1);
}

/// Record the size of a delivered clip.
pub fn record_output_bytes(bytes: usize) {
    histogram!(names::OUTPUT_BYTES).record(bytes as f64);
}

/// Collapse unknown paths into one label value.
fn sanitize_path(path: &str) -> String {
    match path {
        "/" | "/generate" | "/health" | "/healthz" | "/ready" | "/metrics" => path.to_string(),
        _ => "/other".to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/generate"), "/generate");
        assert_eq!(sanitize_path("/"), "/");
        assert_eq!(sanitize_path("/wp-admin/login.php"), "/other");
    }
}
