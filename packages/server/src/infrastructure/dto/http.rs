//! HTTP API response DTOs.

use serde::Serialize;

use super::websocket::TimerStateDto;

/// One row in the `GET /api/sessions` listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryDto {
    pub id: String,
    pub participant_count: usize,
    pub is_running: bool,
    pub created_at: String,
}

/// Roster entry in the session detail response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetailDto {
    pub id: String,
    pub nickname: String,
    pub avatar: String,
    pub is_host: bool,
    pub joined_at: String,
}

/// `GET /api/sessions/{session_id}` response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailDto {
    pub id: String,
    pub participants: Vec<ParticipantDetailDto>,
    pub timer_state: TimerStateDto,
    pub message_count: usize,
    pub created_at: String,
}
