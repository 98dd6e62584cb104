//! HTTP route handlers.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::encoding::VocabularyId;
use crate::service::{PredictionError, PredictionRequest};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(predict))
        .route("/api/vocabulary/:name", get(vocabulary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Predict a train's arrival delay.
async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    // Parse JSON manually so a bad body gets the same error shape as the rest
    let req: PredictRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(body = %String::from_utf8_lossy(&body), "unparsable prediction request");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;
    let request = PredictionRequest::from(req);
    let result = state.predictor.predict(&request)?;

    if !result.is_valid() {
        tracing::warn!(
            station = %request.station_name,
            train = %request.train_id,
            "returning degraded prediction"
        );
    }

    Ok(Json(PredictResponse::from_result(&result)))
}

/// List the labels of one vocabulary.
async fn vocabulary(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<VocabularyResponse>, AppError> {
    let id = name
        .parse::<VocabularyId>()
        .map_err(|e| AppError::NotFound {
            message: e.to_string(),
        })?;

    let labels = state
        .predictor
        .context()
        .encoders()
        .vocabulary(id)
        .labels()
        .to_vec();

    Ok(Json(VocabularyResponse {
        vocabulary: id.to_string(),
        labels,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<PredictionError> for AppError {
    fn from(e: PredictionError) -> Self {
        match e {
            PredictionError::UnknownCategory(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            PredictionError::Model(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        } else {
            tracing::warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
