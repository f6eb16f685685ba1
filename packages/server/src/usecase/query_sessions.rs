//! UseCase: read-only session queries for the HTTP API.

use std::sync::Arc;

use crate::domain::{RepositoryError, Session, SessionId, SessionRepository};

/// Read-only query usecase backing `GET /api/sessions` and
/// `GET /api/sessions/{session_id}`
pub struct QuerySessionsUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl QuerySessionsUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Snapshot of all active sessions, ordered by creation time
    pub async fn list(&self) -> Vec<Session> {
        let mut sessions = self.repository.list_sessions().await;
        sessions.sort_by_key(|s| s.created_at);
        sessions
    }

    /// Full snapshot of one session
    pub async fn detail(&self, id: &SessionId) -> Result<Session, RepositoryError> {
        self.repository.get_session(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Avatar, Nickname, Participant, ParticipantId, Timestamp};
    use crate::infrastructure::repository::InMemorySessionRegistry;

    async fn seed(repository: &InMemorySessionRegistry, created_at: i64) -> SessionId {
        let id = SessionId::generate();
        let mut session = Session::new(id.clone(), Timestamp::new(created_at));
        session
            .add_participant(Participant::new(
                ParticipantId::generate(),
                Nickname::new(format!("user-{created_at}")).unwrap(),
                Avatar::default(),
                Timestamp::new(created_at),
            ))
            .unwrap();
        repository.insert_session(session).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_list_orders_by_creation_time() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        seed(&repository, 3000).await;
        seed(&repository, 1000).await;
        seed(&repository, 2000).await;
        let usecase = QuerySessionsUseCase::new(repository);

        // when:
        let sessions = usecase.list().await;

        // then:
        let times: Vec<i64> = sessions.iter().map(|s| s.created_at.value()).collect();
        assert_eq!(times, vec![1000, 2000, 3000]);
    }

    #[tokio::test]
    async fn test_detail_returns_full_session() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let id = seed(&repository, 1000).await;
        let usecase = QuerySessionsUseCase::new(repository);

        // when:
        let session = usecase.detail(&id).await.unwrap();

        // then:
        assert_eq!(session.id, id);
        assert_eq!(session.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_detail_unknown_session_fails() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let usecase = QuerySessionsUseCase::new(repository);

        // when:
        let result = usecase.detail(&SessionId::generate()).await;

        // then:
        assert!(matches!(result, Err(RepositoryError::SessionNotFound(_))));
    }
}
