//! UseCase: session creation
//!
//! Creates a fresh session with the caller as its only participant. The
//! entity makes the first participant the host, so the creator holds timer
//! authority from the first observable snapshot.

use std::sync::Arc;

use tomodoro_shared::time::get_unix_timestamp;

use crate::domain::{
    Avatar, EventPusher, Nickname, Participant, ParticipantId, PusherChannel, Session,
    SessionId, SessionRepository, Timestamp,
};

use super::error::CreateError;

/// Session creation usecase
pub struct CreateSessionUseCase {
    repository: Arc<dyn SessionRepository>,
    event_pusher: Arc<dyn EventPusher>,
}

impl CreateSessionUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            repository,
            event_pusher,
        }
    }

    /// Create a session with the caller as host.
    ///
    /// # Arguments
    ///
    /// * `nickname` - the creator's display name
    /// * `avatar` - the creator's avatar identifier
    /// * `sender` - the creator's connection channel, registered for pushes
    ///
    /// # Returns
    ///
    /// The stored session snapshot plus the id assigned to the creator.
    pub async fn execute(
        &self,
        nickname: Nickname,
        avatar: Avatar,
        sender: PusherChannel,
    ) -> Result<(Session, ParticipantId), CreateError> {
        let now = Timestamp::new(get_unix_timestamp());
        let session_id = SessionId::generate();
        let participant_id = ParticipantId::generate();

        let mut session = Session::new(session_id, now);
        session.add_participant(Participant::new(
            participant_id.clone(),
            nickname,
            avatar,
            now,
        ))?;

        self.repository.insert_session(session.clone()).await?;
        self.event_pusher
            .register_client(participant_id.clone(), sender)
            .await;

        tracing::info!(
            "Session '{}' created by participant '{}'",
            session.id.as_str(),
            participant_id.as_str()
        );

        Ok((session, participant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pusher::MockEventPusher;
    use crate::infrastructure::repository::InMemorySessionRegistry;

    fn nickname(raw: &str) -> Nickname {
        Nickname::new(raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_session_stores_creator_as_host() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let mut pusher = MockEventPusher::new();
        pusher.expect_register_client().times(1).return_const(());
        let usecase = CreateSessionUseCase::new(repository.clone(), Arc::new(pusher));

        // when:
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let (session, participant_id) = usecase
            .execute(nickname("alice"), Avatar::default(), tx)
            .await
            .unwrap();

        // then:
        assert_eq!(session.participants.len(), 1);
        assert!(session.participants[0].is_host);
        assert_eq!(session.participants[0].id, participant_id);
        assert_eq!(repository.count_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_create_session_starts_with_default_timer() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let mut pusher = MockEventPusher::new();
        pusher.expect_register_client().return_const(());
        let usecase = CreateSessionUseCase::new(repository.clone(), Arc::new(pusher));

        // when:
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let (session, _) = usecase
            .execute(nickname("alice"), Avatar::default(), tx)
            .await
            .unwrap();

        // then:
        assert!(!session.timer.is_running);
        assert_eq!(session.timer.time_remaining_seconds, 25 * 60);
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn test_create_session_assigns_distinct_ids() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let mut pusher = MockEventPusher::new();
        pusher.expect_register_client().return_const(());
        let usecase = CreateSessionUseCase::new(repository.clone(), Arc::new(pusher));

        // when:
        let (tx1, _rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();
        let (first, _) = usecase
            .execute(nickname("alice"), Avatar::default(), tx1)
            .await
            .unwrap();
        let (second, _) = usecase
            .execute(nickname("bob"), Avatar::default(), tx2)
            .await
            .unwrap();

        // then:
        assert_ne!(first.id, second.id);
        assert_eq!(repository.count_sessions().await, 2);
    }
}
