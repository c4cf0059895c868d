//! HTTP route handlers for the study assistant API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::session::engine::core::PREVIEW_CHARS;
use crate::session::{EngineSnapshot, SendOutcome, SessionId, TimerTransition};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/session", get(current_session))
        .route("/api/history", get(list_history))
        .route("/api/history/{index}/load", post(load_history_entry))
        .route("/api/sessions/{id}/load", post(load_archived_session))
        .route("/api/messages", post(send_message))
        .route("/api/conversations", post(new_conversation))
        .route("/api/goal", post(set_goal))
        .route("/api/timer/toggle", post(toggle_timer))
        .route("/api/timer/reset", post(reset_timer))
        .route("/api/fullscreen/toggle", post(toggle_full_screen))
        .route("/api/close", post(close))
        .route("/api/open", post(reopen))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "studydesk-agent",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn current_session(State(state): State<Arc<AppState>>) -> Json<EngineSnapshot> {
    Json(state.engine.snapshot())
}

/// One archived session as listed by `/api/history`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntryDto {
    /// Position in the archive, usable with `/api/history/{index}/load`.
    pub index: usize,
    /// Stable session id.
    pub id: SessionId,
    /// Number of messages in the session.
    pub message_count: usize,
    /// Start of the first user message, if any.
    pub preview: Option<String>,
}

async fn list_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntryDto>> {
    let entries = state
        .engine
        .history()
        .await
        .iter()
        .enumerate()
        .map(|(index, session)| HistoryEntryDto {
            index,
            id: session.id,
            message_count: session.len(),
            preview: session.preview(PREVIEW_CHARS),
        })
        .collect();
    Json(entries)
}

async fn load_history_entry(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<EngineSnapshot>, (StatusCode, String)> {
    if state.engine.load_from_history(index).await {
        Ok(Json(state.engine.snapshot()))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            format!("No archived session at index {index}"),
        ))
    }
}

async fn load_archived_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<EngineSnapshot>, (StatusCode, String)> {
    if state.engine.load_archived(SessionId::from_raw(id)).await {
        Ok(Json(state.engine.snapshot()))
    } else {
        Err((StatusCode::NOT_FOUND, format!("No archived session {id}")))
    }
}

/// Body of requests carrying free text.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    /// User-provided text.
    pub text: String,
}

/// Response to `/api/messages`.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    /// What happened to the call.
    #[serde(flatten)]
    pub outcome: SendOutcome,
    /// Engine state after the call completed.
    pub snapshot: EngineSnapshot,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Json<SendResponse> {
    let outcome = state.engine.send_message(&request.text).await;
    Json(SendResponse {
        outcome,
        snapshot: state.engine.snapshot(),
    })
}

async fn new_conversation(State(state): State<Arc<AppState>>) -> Json<EngineSnapshot> {
    state.engine.start_new_conversation().await;
    Json(state.engine.snapshot())
}

async fn set_goal(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Json<EngineSnapshot> {
    state.engine.set_goal(&request.text).await;
    Json(state.engine.snapshot())
}

/// Response to `/api/timer/toggle`.
#[derive(Debug, Serialize)]
pub struct TimerToggleResponse {
    /// Direction of the toggle.
    pub transition: TimerTransition,
    /// Engine state after the toggle.
    pub snapshot: EngineSnapshot,
}

async fn toggle_timer(State(state): State<Arc<AppState>>) -> Json<TimerToggleResponse> {
    let transition = state.engine.toggle_timer().await;
    Json(TimerToggleResponse {
        transition,
        snapshot: state.engine.snapshot(),
    })
}

async fn reset_timer(State(state): State<Arc<AppState>>) -> Json<EngineSnapshot> {
    state.engine.reset_timer().await;
    Json(state.engine.snapshot())
}

async fn toggle_full_screen(State(state): State<Arc<AppState>>) -> Json<EngineSnapshot> {
    state.engine.toggle_full_screen().await;
    Json(state.engine.snapshot())
}

async fn close(State(state): State<Arc<AppState>>) -> Json<EngineSnapshot> {
    state.engine.close().await;
    Json(state.engine.snapshot())
}

async fn reopen(State(state): State<Arc<AppState>>) -> Json<EngineSnapshot> {
    state.engine.reopen().await;
    Json(state.engine.snapshot())
}
