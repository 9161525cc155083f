//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Creates the rate limiter for directory invalidation.
///
/// # Limits
///
/// - **Rate**: 1 request every 10 seconds
/// - **Burst**: 3 requests
///
/// Every invalidation forces a full reload from the region API, so the
/// budget is much tighter than for reads. Requests exceeding the limit
/// receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/invalidate", post(invalidate_handler))
///     .layer(rate_limit::invalidate_layer());
/// ```
pub fn invalidate_layer()
-> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .period(Duration::from_secs(10))
            .burst_size(3)
            .finish()
            .expect("period and burst size are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
