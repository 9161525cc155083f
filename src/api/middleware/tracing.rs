//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

/// Creates a tracing middleware for HTTP requests.
///
/// # Logging Behavior
///
/// - A span at `INFO` level per request, carrying method, URI and version
/// - Request start at `DEBUG`
/// - Response status and latency (milliseconds) at `INFO`
/// - Server errors (5xx, e.g. region API unavailable) at `WARN`
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET uri=/api/regions/cities version=HTTP/1.1}: finished processing request latency=3 ms status=200
/// WARN request{method=GET uri=/api/regions/counties version=HTTP/1.1}: response failed classification=Status code: 503 Service Unavailable latency=30001 ms
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::WARN)
                .latency_unit(LatencyUnit::Millis),
        )
}
