//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{Session, SessionId},
    infrastructure::dto::http::{ParticipantDetailDto, SessionDetailDto, SessionSummaryDto},
    ui::state::AppState,
};
use tomodoro_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of active sessions
pub async fn get_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummaryDto>> {
    let sessions = state.query_sessions_usecase.list().await;

    let summaries = sessions
        .iter()
        .map(|session| SessionSummaryDto {
            id: session.id.as_str().to_string(),
            participant_count: session.participants.len(),
            is_running: session.timer.is_running,
            created_at: timestamp_to_rfc3339(session.created_at.value()),
        })
        .collect();

    Json(summaries)
}

/// Get session detail by id
pub async fn get_session_detail(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailDto>, StatusCode> {
    let session_id = SessionId::new(session_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    let session = state
        .query_sessions_usecase
        .detail(&session_id)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(Json(to_detail_dto(&session)))
}

fn to_detail_dto(session: &Session) -> SessionDetailDto {
    SessionDetailDto {
        id: session.id.as_str().to_string(),
        participants: session
            .participants
            .iter()
            .map(|p| ParticipantDetailDto {
                id: p.id.as_str().to_string(),
                nickname: p.nickname.as_str().to_string(),
                avatar: p.avatar.as_str().to_string(),
                is_host: p.is_host,
                joined_at: timestamp_to_rfc3339(p.joined_at.value()),
            })
            .collect(),
        timer_state: session.timer.clone().into(),
        message_count: session.messages.len(),
        created_at: timestamp_to_rfc3339(session.created_at.value()),
    }
}
