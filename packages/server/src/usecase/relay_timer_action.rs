//! UseCase: relaying a host's timer snapshot
//!
//! The client-side bridge already refuses timer mutations from guests; this
//! usecase enforces the same rule server-side as defense in depth. A
//! snapshot from anyone but the session's host is dropped with `NotHost`
//! and never stored or rebroadcast.

use std::sync::Arc;

use crate::domain::{
    EventPusher, ParticipantId, RepositoryError, SessionId, SessionRepository, TimerSnapshot,
};

use super::error::RelayError;

/// Timer snapshot relay usecase
pub struct RelayTimerActionUseCase {
    repository: Arc<dyn SessionRepository>,
    event_pusher: Arc<dyn EventPusher>,
}

impl RelayTimerActionUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            repository,
            event_pusher,
        }
    }

    /// Store the host's snapshot and return the broadcast targets (every
    /// member except the host itself).
    pub async fn execute(
        &self,
        session_id: &SessionId,
        sender_id: &ParticipantId,
        snapshot: TimerSnapshot,
    ) -> Result<Vec<ParticipantId>, RelayError> {
        let session = match self.repository.get_session(session_id).await {
            Ok(session) => session,
            Err(RepositoryError::SessionNotFound(id)) => {
                return Err(RelayError::SessionNotFound(id));
            }
            Err(e) => return Err(RelayError::BroadcastFailed(e.to_string())),
        };

        // Authority check comes first: only the host may mutate the timer.
        if !session.is_host(sender_id) {
            return Err(RelayError::NotHost(sender_id.as_str().to_string()));
        }

        self.repository
            .apply_timer_snapshot(session_id, snapshot)
            .await
            .map_err(|e| RelayError::BroadcastFailed(e.to_string()))?;

        let targets: Vec<ParticipantId> = session
            .member_ids()
            .into_iter()
            .filter(|id| id != sender_id)
            .collect();

        Ok(targets)
    }

    /// Push the serialized `timer-update` to the given members.
    pub async fn broadcast_timer_update(
        &self,
        targets: Vec<ParticipantId>,
        message: &str,
    ) -> Result<(), RelayError> {
        self.event_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| RelayError::BroadcastFailed(e.to_string()))
    }
}
