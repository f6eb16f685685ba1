//! In-memory session registry.
//!
//! Implements the domain's `SessionRepository` trait over a `HashMap` behind
//! a single lock. Sessions live only as long as they have members; the last
//! departure destroys the record. Nothing is persisted: shared timer state
//! is live collaboration state only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, Departure, Participant, RepositoryError, Session, SessionId, SessionRepository,
    TimerSnapshot,
};
use crate::domain::ParticipantId;

/// In-memory `SessionRepository` implementation
pub struct InMemorySessionRegistry {
    /// Key: session id (String)
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRegistry {
    async fn insert_session(&self, session: Session) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.as_str().to_string(), session);
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Session, RepositoryError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| RepositoryError::SessionNotFound(id.as_str().to_string()))
    }

    async fn add_participant(
        &self,
        id: &SessionId,
        participant: Participant,
    ) -> Result<Session, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(id.as_str())
            .ok_or_else(|| RepositoryError::SessionNotFound(id.as_str().to_string()))?;
        session.add_participant(participant)?;
        Ok(session.clone())
    }

    async fn remove_participant(
        &self,
        id: &SessionId,
        participant_id: &ParticipantId,
    ) -> Result<Departure, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(id.as_str())
            .ok_or_else(|| RepositoryError::SessionNotFound(id.as_str().to_string()))?;

        let departure = session.remove_participant(participant_id).ok_or_else(|| {
            RepositoryError::ParticipantNotFound(participant_id.as_str().to_string())
        })?;

        // A session without members is destroyed.
        if session.is_empty() {
            sessions.remove(id.as_str());
            tracing::info!("Session '{}' destroyed (last participant left)", id.as_str());
        }

        Ok(departure)
    }

    async fn apply_timer_snapshot(
        &self,
        id: &SessionId,
        snapshot: TimerSnapshot,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(id.as_str())
            .ok_or_else(|| RepositoryError::SessionNotFound(id.as_str().to_string()))?;
        session.apply_timer(snapshot);
        Ok(())
    }

    async fn add_message(
        &self,
        id: &SessionId,
        message: ChatMessage,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(id.as_str())
            .ok_or_else(|| RepositoryError::SessionNotFound(id.as_str().to_string()))?;
        session.add_message(message)?;
        Ok(())
    }

    async fn member_ids(&self, id: &SessionId) -> Result<Vec<ParticipantId>, RepositoryError> {
        let sessions = self.sessions.lock().await;
        let session = sessions
            .get(id.as_str())
            .ok_or_else(|| RepositoryError::SessionNotFound(id.as_str().to_string()))?;
        Ok(session.member_ids())
    }

    async fn count_sessions(&self) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.len()
    }

    async fn list_sessions(&self) -> Vec<Session> {
        let sessions = self.sessions.lock().await;
        sessions.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Avatar, Nickname, Timestamp};

    fn registry() -> InMemorySessionRegistry {
        InMemorySessionRegistry::new()
    }

    fn participant(nickname: &str, joined_at: i64) -> Participant {
        Participant::new(
            ParticipantId::generate(),
            Nickname::new(nickname.to_string()).unwrap(),
            Avatar::default(),
            Timestamp::new(joined_at),
        )
    }

    async fn seeded_session(repo: &InMemorySessionRegistry) -> (SessionId, ParticipantId) {
        let id = SessionId::generate();
        let mut session = Session::new(id.clone(), Timestamp::new(1000));
        let host = participant("alice", 1000);
        let host_id = host.id.clone();
        session.add_participant(host).unwrap();
        repo.insert_session(session).await.unwrap();
        (id, host_id)
    }

    #[tokio::test]
    async fn test_insert_and_get_session() {
        // given:
        let repo = registry();
        let (id, _) = seeded_session(&repo).await;

        // when:
        let session = repo.get_session(&id).await.unwrap();

        // then:
        assert_eq!(session.id, id);
        assert_eq!(session.participants.len(), 1);
        assert_eq!(repo.count_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_session_returns_not_found() {
        // given:
        let repo = registry();

        // when:
        let result = repo.get_session(&SessionId::generate()).await;

        // then:
        assert!(matches!(result, Err(RepositoryError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_participant_returns_updated_snapshot() {
        // given:
        let repo = registry();
        let (id, _) = seeded_session(&repo).await;

        // when:
        let session = repo
            .add_participant(&id, participant("bob", 2000))
            .await
            .unwrap();

        // then:
        assert_eq!(session.participants.len(), 2);
        assert!(!session.participants[1].is_host);
    }

    #[tokio::test]
    async fn test_remove_last_participant_destroys_session() {
        // given:
        let repo = registry();
        let (id, host_id) = seeded_session(&repo).await;

        // when:
        let departure = repo.remove_participant(&id, &host_id).await.unwrap();

        // then:
        assert!(departure.participants.is_empty());
        assert_eq!(repo.count_sessions().await, 0);
        assert!(matches!(
            repo.get_session(&id).await,
            Err(RepositoryError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_host_reports_new_host() {
        // given:
        let repo = registry();
        let (id, host_id) = seeded_session(&repo).await;
        repo.add_participant(&id, participant("bob", 2000))
            .await
            .unwrap();

        // when:
        let departure = repo.remove_participant(&id, &host_id).await.unwrap();

        // then:
        let new_host = departure.new_host.unwrap();
        assert_eq!(new_host.nickname.as_str(), "bob");
        assert!(new_host.is_host);
        assert_eq!(repo.count_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_participant_returns_not_found() {
        // given:
        let repo = registry();
        let (id, _) = seeded_session(&repo).await;

        // when:
        let result = repo
            .remove_participant(&id, &ParticipantId::generate())
            .await;

        // then:
        assert!(matches!(
            result,
            Err(RepositoryError::ParticipantNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_timer_snapshot_overwrites_stored_state() {
        // given:
        let repo = registry();
        let (id, _) = seeded_session(&repo).await;
        let snapshot = TimerSnapshot {
            is_running: true,
            time_remaining_seconds: 600,
            ..TimerSnapshot::default()
        };

        // when:
        repo.apply_timer_snapshot(&id, snapshot.clone())
            .await
            .unwrap();

        // then:
        let session = repo.get_session(&id).await.unwrap();
        assert_eq!(session.timer, snapshot);
    }

    #[tokio::test]
    async fn test_member_ids_lists_all_participants() {
        // given:
        let repo = registry();
        let (id, host_id) = seeded_session(&repo).await;
        let bob = participant("bob", 2000);
        let bob_id = bob.id.clone();
        repo.add_participant(&id, bob).await.unwrap();

        // when:
        let ids = repo.member_ids(&id).await.unwrap();

        // then:
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&host_id));
        assert!(ids.contains(&bob_id));
    }
}
