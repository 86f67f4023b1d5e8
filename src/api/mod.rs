//! REST API endpoints.
//!
//! Axum-based HTTP API exposing the team and map analytics as JSON. Every
//! successful response is wrapped in an [`Envelope`] that tells an empty
//! result apart from a populated one; failures use [`ApiError`].

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::calculate::AnalyticsError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Store failure or timeout. Safe to retry.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AnalyticsError::Store(_) | AnalyticsError::Timeout(_) => {
                warn!(error = %err, "analytics request failed");
                ApiError::Unavailable(err.to_string())
            }
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                retryable: matches!(self, ApiError::Unavailable(_)),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Whether a successful result carried any data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Empty,
}

/// Success body: `{ "status": "ok" | "empty", "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: ResultStatus,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T, is_empty: bool) -> Self {
        let status = if is_empty {
            ResultStatus::Empty
        } else {
            ResultStatus::Ok
        };
        Self { status, data }
    }
}

impl<T> Envelope<Option<T>> {
    /// `None` becomes an empty envelope with `null` data.
    pub fn from_option(data: Option<T>) -> Self {
        let is_empty = data.is_none();
        Self::new(data, is_empty)
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin.parse::<HeaderValue>() {
        Ok(value) if origin != "*" => AllowOrigin::exact(value),
        _ => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/teams/:team_id/roster", get(routes::teams::roster))
        .route("/api/teams/:team_id/overview", get(routes::teams::overview))
        .route("/api/teams/:team_id/roles", get(routes::teams::roles))
        .route("/api/teams/:team_id/role-balance", get(routes::teams::role_balance))
        .route("/api/teams/:team_id/hero-pool", get(routes::teams::hero_pool))
        .route("/api/teams/:team_id/map-modes", get(routes::teams::map_modes))
        .route("/api/teams/:team_id/trends", get(routes::teams::trends))
        .route("/api/teams/:team_id/quick-wins", get(routes::teams::quick_wins))
        .route("/api/teams/:team_id/trios", get(routes::teams::trios))
        .route("/api/teams/:team_id/fights", get(routes::teams::fights))
        .route("/api/teams/:team_id/report", get(routes::teams::report))
        .route("/api/maps/:map_id/mvp", get(routes::maps::map_mvp))
        .route(
            "/api/maps/:map_id/players/:player/mvp",
            get(routes::maps::player_mvp),
        )
        .route("/api/compare", get(routes::compare::compare))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
