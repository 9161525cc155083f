//! Handlers for region directory queries.
//!
//! Every read goes through [`RegionDirectoryCache`](crate::application::services::RegionDirectoryCache):
//! the first request after startup, expiry or invalidation waits for the load,
//! and concurrent requests share it. A failed load is reported as
//! `503 source_unavailable`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::info;

use crate::api::dto::regions::{
    CountiesQuery, HasCountiesResponse, RegionListResponse, StatsResponse, TownshipsQuery,
};
use crate::application::services::CacheStatus;
use crate::domain::entities::RegionLevel;
use crate::error::AppError;
use crate::state::AppState;

/// Lists all cities.
///
/// # Endpoint
///
/// `GET /api/regions/cities`
pub async fn cities_handler(
    State(state): State<AppState>,
) -> Result<Json<RegionListResponse>, AppError> {
    let cities = state.regions.cities().await?;
    Ok(Json(RegionListResponse::new(RegionLevel::City, cities)))
}

/// Lists counties, optionally restricted to one city.
///
/// # Endpoint
///
/// `GET /api/regions/counties?city=Guangzhou`
///
/// An absent or empty `city` returns every county.
pub async fn counties_handler(
    State(state): State<AppState>,
    Query(params): Query<CountiesQuery>,
) -> Result<Json<RegionListResponse>, AppError> {
    let counties = state.regions.counties(params.city.as_deref()).await?;
    Ok(Json(RegionListResponse::new(RegionLevel::County, counties)))
}

/// Lists townships.
///
/// # Endpoint
///
/// `GET /api/regions/townships?county=Panyu&city=Guangzhou`
///
/// # Query Parameters
///
/// - `county` (optional): townships of this county; takes precedence
/// - `city` (optional): without `county`, townships of this city that have no county
///
/// With neither, every township is returned.
pub async fn townships_handler(
    State(state): State<AppState>,
    Query(params): Query<TownshipsQuery>,
) -> Result<Json<RegionListResponse>, AppError> {
    let townships = state
        .regions
        .townships(params.county.as_deref(), params.city.as_deref())
        .await?;
    Ok(Json(RegionListResponse::new(
        RegionLevel::Township,
        townships,
    )))
}

/// Reports whether a city has at least one county.
///
/// # Endpoint
///
/// `GET /api/regions/cities/{city}/has-counties`
pub async fn city_has_counties_handler(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<HasCountiesResponse>, AppError> {
    let has_counties = state.regions.city_has_counties(&city).await?;
    Ok(Json(HasCountiesResponse { city, has_counties }))
}

/// Returns counts and age of the held directory without loading it.
///
/// # Endpoint
///
/// `GET /api/regions/stats`
///
/// # Errors
///
/// Returns `404 not_loaded` when nothing has been loaded yet.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state
        .regions
        .cache_stats()
        .await
        .ok_or_else(|| AppError::not_loaded("Region directory has not been loaded"))?;

    let status = match state.regions.status().await {
        CacheStatus::Ready => "ready",
        CacheStatus::Expired => "expired",
        CacheStatus::Loading => "loading",
        CacheStatus::Empty => return Err(AppError::not_loaded("Region directory has not been loaded")),
    };

    Ok(Json(StatsResponse::new(
        status,
        stats,
        state.regions.store_backend(),
    )))
}

/// Drops the held directory and its snapshot; the next read reloads.
///
/// # Endpoint
///
/// `POST /api/regions/invalidate`
///
/// # Response Codes
///
/// - **204 No Content**: Invalidated
/// - **429 Too Many Requests**: Rate limit exceeded
pub async fn invalidate_handler(State(state): State<AppState>) -> StatusCode {
    state.regions.invalidate().await;
    info!("Region directory invalidated via API");
    StatusCode::NO_CONTENT
}
