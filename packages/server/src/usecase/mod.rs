//! UseCase layer: one type per session-registry operation.

pub mod create_session;
pub mod error;
pub mod join_session;
pub mod leave_session;
pub mod query_sessions;
pub mod relay_chat_message;
pub mod relay_timer_action;

pub use create_session::CreateSessionUseCase;
pub use error::{CreateError, JoinError, LeaveError, RelayError};
pub use join_session::JoinSessionUseCase;
pub use leave_session::LeaveSessionUseCase;
pub use query_sessions::QuerySessionsUseCase;
pub use relay_chat_message::RelayChatMessageUseCase;
pub use relay_timer_action::RelayTimerActionUseCase;
