//! Shared application state for the axum handlers.

use std::sync::Arc;

use crate::usecase::{
    CreateSessionUseCase, JoinSessionUseCase, LeaveSessionUseCase, QuerySessionsUseCase,
    RelayChatMessageUseCase, RelayTimerActionUseCase,
};

/// Shared application state
pub struct AppState {
    pub create_session_usecase: Arc<CreateSessionUseCase>,
    pub join_session_usecase: Arc<JoinSessionUseCase>,
    pub leave_session_usecase: Arc<LeaveSessionUseCase>,
    pub relay_timer_action_usecase: Arc<RelayTimerActionUseCase>,
    pub relay_chat_message_usecase: Arc<RelayChatMessageUseCase>,
    pub query_sessions_usecase: Arc<QuerySessionsUseCase>,
}
