//! Repository trait for session storage.
//!
//! The domain layer defines the interface it needs from the data store; the
//! infrastructure layer provides the implementation (dependency inversion).

use async_trait::async_trait;

use super::entity::{ChatMessage, Departure, Participant, Session, TimerSnapshot};
use super::error::RepositoryError;
use super::value_object::{ParticipantId, SessionId};

/// Session store interface used by the usecase layer.
///
/// Implementations must apply each mutation atomically: in particular,
/// `remove_participant` performs removal, host election and empty-session
/// destruction under a single lock, so the single-host invariant holds at
/// every observable point.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a freshly created session
    async fn insert_session(&self, session: Session) -> Result<(), RepositoryError>;

    /// Fetch a full session snapshot
    async fn get_session(&self, id: &SessionId) -> Result<Session, RepositoryError>;

    /// Add a participant and return the updated session snapshot
    async fn add_participant(
        &self,
        id: &SessionId,
        participant: Participant,
    ) -> Result<Session, RepositoryError>;

    /// Remove a participant; destroys the session when it becomes empty
    async fn remove_participant(
        &self,
        id: &SessionId,
        participant_id: &ParticipantId,
    ) -> Result<Departure, RepositoryError>;

    /// Replace the shared timer snapshot of a session
    async fn apply_timer_snapshot(
        &self,
        id: &SessionId,
        snapshot: TimerSnapshot,
    ) -> Result<(), RepositoryError>;

    /// Append a chat message to a session's transcript
    async fn add_message(
        &self,
        id: &SessionId,
        message: ChatMessage,
    ) -> Result<(), RepositoryError>;

    /// List all member ids of a session
    async fn member_ids(&self, id: &SessionId) -> Result<Vec<ParticipantId>, RepositoryError>;

    /// Number of active sessions
    async fn count_sessions(&self) -> usize;

    /// Snapshot of all active sessions
    async fn list_sessions(&self) -> Vec<Session>;
}
