//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::matcher::TimingResult;
use crate::realtime::{RealtimeError, VisitSource};
use crate::service::ServiceError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S: VisitSource>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health::<S>))
        .route("/api/idfm/lines/:type/:id", get(line::<S>))
        .route("/api/idfm/timings/:type/:id/:stop", get(timings::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check with snapshot and cache counters.
async fn health<S: VisitSource>(State(state): State<AppState<S>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        report: state.service.health().await,
    })
}

/// Resolve a line to its canonical id.
async fn line<S: VisitSource>(
    State(state): State<AppState<S>>,
    Path((mode, short_name)): Path<(String, String)>,
    Query(params): Query<LineParams>,
) -> Result<Json<LineResponse>, AppError> {
    let id = state
        .service
        .line(&mode, &short_name, params.operator.as_deref())
        .await?;

    Ok(Json(LineResponse {
        id: id.as_str().to_string(),
    }))
}

/// Upcoming departures at a stop.
async fn timings<S: VisitSource>(
    State(state): State<AppState<S>>,
    Path((mode, line, stop)): Path<(String, String, String)>,
    Query(params): Query<TimingParams>,
) -> Result<Json<Vec<TimingResult>>, AppError> {
    let query = params.into_query(mode, line, stop);
    let results = state.service.timings(&query).await?;
    Ok(Json(results))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Configuration(_) | ServiceError::Resolve(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            ServiceError::Realtime(RealtimeError::AllStopsFailed { .. }) => AppError::BadGateway {
                message: e.to_string(),
            },
            ServiceError::Realtime(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
