use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use stockfish_bridge_core::{EngineResult, Error};

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/bestmove", post(best_move))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Anything that ends a request early, rendered as `{"error": ...}`
pub enum ApiError {
    Engine(Error),
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::Engine(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Engine(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Engine(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

#[derive(Deserialize)]
pub struct BestMoveRequest {
    pub fen: Option<String>,
    pub depth: Option<u32>,
}

pub async fn index() -> &'static str {
    "Stockfish backend is alive!"
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn best_move(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BestMoveRequest>, JsonRejection>,
) -> Result<Json<EngineResult>, ApiError> {
    let Json(req) = payload?;
    let result = state.bridge.handle(req.fen, req.depth).await?;
    Ok(Json(result))
}
