//! UseCase: joining an existing session
//!
//! Adds the caller to the session as a guest and returns the full session
//! snapshot, so the joiner starts from ground truth instead of an empty or
//! stale view. The roster broadcast to existing members always carries the
//! full participant list, never a delta.

use std::sync::Arc;

use tomodoro_shared::time::get_unix_timestamp;

use crate::domain::{
    Avatar, DomainError, EventPusher, Nickname, Participant, ParticipantId, PusherChannel,
    RepositoryError, Session, SessionId, SessionRepository, Timestamp,
};

use super::error::JoinError;

/// Session join usecase
pub struct JoinSessionUseCase {
    repository: Arc<dyn SessionRepository>,
    event_pusher: Arc<dyn EventPusher>,
}

impl JoinSessionUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            repository,
            event_pusher,
        }
    }

    /// Join an existing session.
    ///
    /// # Returns
    ///
    /// The full updated session snapshot plus the id assigned to the joiner.
    pub async fn execute(
        &self,
        session_id: SessionId,
        nickname: Nickname,
        avatar: Avatar,
        sender: PusherChannel,
    ) -> Result<(Session, ParticipantId), JoinError> {
        let now = Timestamp::new(get_unix_timestamp());
        let participant_id = ParticipantId::generate();
        let participant = Participant::new(participant_id.clone(), nickname, avatar, now);

        let session = match self.repository.add_participant(&session_id, participant).await {
            Ok(session) => session,
            Err(RepositoryError::SessionNotFound(id)) => {
                return Err(JoinError::SessionNotFound(id));
            }
            Err(RepositoryError::Domain(DomainError::SessionCapacityExceeded)) => {
                return Err(JoinError::SessionFull);
            }
            Err(RepositoryError::Domain(DomainError::NicknameTaken(name))) => {
                return Err(JoinError::NicknameTaken(name));
            }
            Err(e) => return Err(JoinError::Repository(e)),
        };

        self.event_pusher
            .register_client(participant_id.clone(), sender)
            .await;

        tracing::info!(
            "Participant '{}' joined session '{}'",
            participant_id.as_str(),
            session.id.as_str()
        );

        Ok((session, participant_id))
    }

    /// Broadcast the post-join roster to every member except the joiner.
    pub async fn broadcast_participant_joined(
        &self,
        session: &Session,
        new_participant_id: &ParticipantId,
        message: &str,
    ) -> Result<(), String> {
        let targets: Vec<ParticipantId> = session
            .member_ids()
            .into_iter()
            .filter(|id| id != new_participant_id)
            .collect();

        self.event_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
