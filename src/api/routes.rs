//! API route configuration.

use crate::api::handlers::{
    cities_handler, city_has_counties_handler, counties_handler, invalidate_handler,
    stats_handler, townships_handler,
};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Region directory routes, nested under `/api/regions`.
///
/// # Endpoints
///
/// - `GET  /cities`                    - All cities
/// - `GET  /counties?city=`            - Counties, optionally of one city
/// - `GET  /townships?county=&city=`   - Townships of a county or city
/// - `GET  /cities/{city}/has-counties` - Whether a city has counties
/// - `GET  /stats`                     - Counts and age of the held directory
/// - `POST /invalidate`                - Drop the directory and its snapshot (rate limited)
pub fn region_routes() -> Router<AppState> {
    let invalidate = Router::new()
        .route("/invalidate", post(invalidate_handler))
        .layer(rate_limit::invalidate_layer());

    Router::new()
        .route("/cities", get(cities_handler))
        .route("/counties", get(counties_handler))
        .route("/townships", get(townships_handler))
        .route("/cities/{city}/has-counties", get(city_has_counties_handler))
        .route("/stats", get(stats_handler))
        .merge(invalidate)
}
