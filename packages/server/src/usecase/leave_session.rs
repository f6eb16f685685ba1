//! UseCase: leaving a session
//!
//! Removes the participant from the session; when the departing member was
//! the host, the repository's atomic removal already elected a replacement,
//! and the departure result names the new host so remaining members can be
//! told. Disconnects without an explicit leave run through the same path.

use std::sync::Arc;

use crate::domain::{
    Departure, EventPusher, ParticipantId, RepositoryError, SessionId, SessionRepository,
};

use super::error::LeaveError;

/// Session leave usecase
pub struct LeaveSessionUseCase {
    repository: Arc<dyn SessionRepository>,
    event_pusher: Arc<dyn EventPusher>,
}

impl LeaveSessionUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            repository,
            event_pusher,
        }
    }

    /// Remove a participant from a session.
    ///
    /// # Returns
    ///
    /// The departure result: remaining roster and, when the host left, the
    /// newly elected host.
    pub async fn execute(
        &self,
        session_id: &SessionId,
        participant_id: &ParticipantId,
    ) -> Result<Departure, LeaveError> {
        let departure = match self
            .repository
            .remove_participant(session_id, participant_id)
            .await
        {
            Ok(departure) => departure,
            Err(RepositoryError::SessionNotFound(id)) => {
                return Err(LeaveError::SessionNotFound(id));
            }
            Err(RepositoryError::ParticipantNotFound(id)) => {
                return Err(LeaveError::ParticipantNotFound(id));
            }
            Err(RepositoryError::Domain(e)) => {
                // Removal has no domain rules that can fail; treat as absent.
                tracing::warn!("Unexpected domain error on leave: {}", e);
                return Err(LeaveError::ParticipantNotFound(
                    participant_id.as_str().to_string(),
                ));
            }
        };

        self.event_pusher.unregister_client(participant_id).await;

        tracing::info!(
            "Participant '{}' left session '{}'",
            participant_id.as_str(),
            session_id.as_str()
        );

        Ok(departure)
    }

    /// Broadcast the post-departure roster to the remaining members.
    pub async fn broadcast_participant_left(
        &self,
        departure: &Departure,
        message: &str,
    ) -> Result<(), String> {
        let targets: Vec<ParticipantId> = departure
            .participants
            .iter()
            .map(|p| p.id.clone())
            .collect();

        self.event_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
