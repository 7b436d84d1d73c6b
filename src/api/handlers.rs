//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{ErrorResponse, SubmitRequest, SuccessResponse, WidgetResponse};
use super::AppState;
use crate::config::WidgetConfig;
use crate::runtime::{TranscriptEvent, WidgetError};
use crate::state_machine::TransitionError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Mounting
        .route("/api/widgets", post(create_widget))
        .route("/api/widgets/:id", get(get_widget).delete(delete_widget))
        // Visitor actions
        .route("/api/widgets/:id/submit", post(submit))
        .route("/api/widgets/:id/reinitialize", post(reinitialize))
        // SSE streaming
        .route("/api/widgets/:id/stream", get(stream_widget))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Lifecycle
// ============================================================

async fn create_widget(
    State(state): State<AppState>,
    Json(config): Json<WidgetConfig>,
) -> Json<WidgetResponse> {
    let (_, widget) = state.widgets.create(config).await;
    Json(WidgetResponse {
        widget: widget.snapshot(),
    })
}

async fn get_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WidgetResponse>, AppError> {
    let widget = state
        .widgets
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found(&id))?;

    Ok(Json(WidgetResponse {
        widget: widget.snapshot(),
    }))
}

async fn reinitialize(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(config): Json<WidgetConfig>,
) -> Result<Json<WidgetResponse>, AppError> {
    let widget = state
        .widgets
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found(&id))?;

    let snapshot = widget.reinitialize(config).await?;
    Ok(Json(WidgetResponse { widget: snapshot }))
}

async fn delete_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.widgets.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::not_found(&id))
    }
}

// ============================================================
// Visitor Input
// ============================================================

async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<WidgetResponse>, AppError> {
    let widget = state
        .widgets
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found(&id))?;

    let snapshot = widget.submit(&req.text).await?;
    Ok(Json(WidgetResponse { widget: snapshot }))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let widget = state
        .widgets
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found(&id))?;

    // Subscribe before the snapshot so no message falls between the two
    let broadcast_rx = widget.subscribe();
    let snapshot = widget.snapshot();

    Ok(sse_stream(TranscriptEvent::Init { snapshot }, broadcast_rx))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String, Option<Vec<String>>),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    fn not_found(id: &str) -> Self {
        AppError::NotFound(format!("Widget not found: {id}"))
    }
}

impl From<WidgetError> for AppError {
    fn from(error: WidgetError) -> Self {
        let message = error.to_string();
        match error {
            WidgetError::Busy | WidgetError::Transition(TransitionError::Busy) => {
                AppError::Conflict(message)
            }
            WidgetError::EmptyInput => AppError::BadRequest(message, None),
            WidgetError::OptionRequired { options } => AppError::BadRequest(message, Some(options)),
            WidgetError::Closed => AppError::NotFound(message),
            WidgetError::Transition(TransitionError::InvalidTransition(_)) => {
                tracing::error!(error = %message, "Flow engine rejected input");
                AppError::Internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg, options) => {
                let body = ErrorResponse::new(msg);
                (
                    StatusCode::BAD_REQUEST,
                    match options {
                        Some(options) => body.with_options(options),
                        None => body,
                    },
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::new(msg)),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}
