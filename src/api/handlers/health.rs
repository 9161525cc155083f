//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::application::services::CacheStatus;
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Source**: A directory is held, or can be loaded now
/// 2. **Snapshot store**: Backend health probe
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "source": { "status": "ok", "message": "Directory held: 412 regions" },
///     "snapshot_store": { "status": "ok", "message": "redis reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (source_check, store_check) = tokio::join!(check_source(&state), check_store(&state));

    let all_healthy = source_check.is_ok() && store_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            source: source_check,
            snapshot_store: store_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Uses the held directory while it is fresh; otherwise attempts a load.
async fn check_source(state: &AppState) -> CheckStatus {
    if state.regions.status().await == CacheStatus::Ready
        && let Some(directory) = state.regions.peek().await
    {
        let total = directory.cities.len() + directory.counties.len() + directory.townships.len();
        return CheckStatus::ok(format!("Directory held: {} regions", total));
    }

    match state.regions.ensure_loaded().await {
        Ok(directory) => CheckStatus::ok(format!(
            "Directory loaded: {} cities",
            directory.cities.len()
        )),
        Err(e) => CheckStatus::error(e.to_string()),
    }
}

async fn check_store(state: &AppState) -> CheckStatus {
    let backend = state.regions.store_backend();
    if state.regions.store_healthy().await {
        CheckStatus::ok(format!("{} reachable", backend))
    } else {
        CheckStatus::error(format!("{} unreachable", backend))
    }
}
