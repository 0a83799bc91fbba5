//! API route handlers.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        FromRequestParts, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::courses::CourseLookup;
use crate::error::QueryError;
use crate::query::{FormFilterParams, RaceFilterParams};
use crate::service;
use crate::stats::compute_race_stats;
use crate::storage::RecordStore;
use crate::types::{
    CoursesResponse, ErrorResponse, FilterOptions, HealthResponse, RaceDetailResponse,
    RaceStatsResponse, RacecardParams, RacecardsResponse, RacesResponse, RunnerFormResponse,
    StatsParams,
};

/// Application state shared across handlers.
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub courses: Arc<dyn CourseLookup>,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        if err.is_client_error() {
            ApiError::bad_request(err.to_string())
        } else {
            tracing::error!("{:#}", err);
            ApiError::internal("A database error occurred")
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Path extractor whose rejections render as [`ApiError`] JSON.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query-string extractor whose rejections render as [`ApiError`] JSON.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/races", get(races))
        .route("/api/races/:race_id", get(race_detail))
        .route("/api/races/:race_id/stats", get(race_stats))
        .route("/api/stats", get(stats))
        .route("/api/runners/:runner_id/form", get(runner_form))
        .route("/api/courses", get(courses))
        .route("/api/racecards", get(racecards))
        .route("/api/filter-options", get(filter_options))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Races with optional date/course/going/distance/class/time filters.
pub async fn races(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<RaceFilterParams>,
) -> Result<Json<RacesResponse>, ApiError> {
    let races = service::list_races(state.store.as_ref(), params)?;
    Ok(Json(RacesResponse {
        count: races.len(),
        races,
    }))
}

/// Race card with all runners and their form.
pub async fn race_detail(
    State(state): State<Arc<AppState>>,
    ApiPath(race_id): ApiPath<i64>,
) -> Result<Json<RaceDetailResponse>, ApiError> {
    service::race_detail(state.store.as_ref(), state.courses.as_ref(), race_id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Race {} not found", race_id)))
}

/// Per-runner form statistics for a race in the path.
pub async fn race_stats(
    State(state): State<Arc<AppState>>,
    ApiPath(race_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<FormFilterParams>,
) -> Result<Json<RaceStatsResponse>, ApiError> {
    let runners = compute_race_stats(state.store.as_ref(), Some(race_id), params)?;
    Ok(Json(RaceStatsResponse {
        race_id,
        count: runners.len(),
        runners,
    }))
}

/// Per-runner form statistics, race given as `?race_id=`.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<StatsParams>,
) -> Result<Json<RaceStatsResponse>, ApiError> {
    let race_id = service::parse_race_id(params.race_id)?;
    let runners = compute_race_stats(state.store.as_ref(), race_id, params.filters)?;
    Ok(Json(RaceStatsResponse {
        // compute_race_stats has already rejected a missing id
        race_id: race_id.unwrap_or_default(),
        count: runners.len(),
        runners,
    }))
}

/// Filtered form history for one runner.
pub async fn runner_form(
    State(state): State<Arc<AppState>>,
    ApiPath(runner_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<FormFilterParams>,
) -> Result<Json<RunnerFormResponse>, ApiError> {
    service::runner_form(state.store.as_ref(), runner_id, params)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Runner {} not found", runner_id)))
}

/// Courses in the database with their characteristics.
pub async fn courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CoursesResponse>, ApiError> {
    let courses = service::course_listing(state.store.as_ref(), state.courses.as_ref())?;
    Ok(Json(CoursesResponse {
        count: courses.len(),
        courses,
    }))
}

/// Race cards for a date.
pub async fn racecards(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<RacecardParams>,
) -> Result<Json<RacecardsResponse>, ApiError> {
    Ok(Json(service::racecards(state.store.as_ref(), params)?))
}

/// Available goings, distances and classes.
pub async fn filter_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilterOptions>, ApiError> {
    Ok(Json(service::filter_options(state.store.as_ref())?))
}
