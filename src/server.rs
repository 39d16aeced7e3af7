//! Webhook HTTP boundary.
//!
//! `POST /` accepts a Telegram update, `GET /health` answers liveness probes.
//! Payload validation is left to axum's `Json` extractor: a body that does not
//! match [`Update`] is rejected before the dispatcher runs.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::dispatcher::Dispatcher;
use crate::models::Update;

/// Shared application state
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

/// Turns a dispatch failure into a 500 with a JSON body
pub struct AppError(anyhow::Error);

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Failed to process webhook update: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": format!("{:#}", self.0)})),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(telegram_webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    Json(update): Json<Update>,
) -> Result<Json<Value>, AppError> {
    info!("Telegram webhook request: update {}", update.update_id);

    state.dispatcher.dispatch(&update).await?;

    info!("Telegram webhook request processed successfully");
    Ok(Json(json!({"ok": true})))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
