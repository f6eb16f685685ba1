//! UseCase: relaying a chat message
//!
//! The registry assigns the message id and timestamp, appends to the
//! session transcript and broadcasts to every member INCLUDING the sender.
//! The sender's own transcript append happens only on that echo, which is
//! what gives all clients a single total order.

use std::sync::Arc;

use tomodoro_shared::time::get_unix_timestamp;

use crate::domain::{
    ChatMessage, DomainError, EventPusher, MessageId, MessageText, ParticipantId,
    RepositoryError, SessionId, SessionRepository, Timestamp,
};

use super::error::RelayError;

/// Chat relay usecase
pub struct RelayChatMessageUseCase {
    repository: Arc<dyn SessionRepository>,
    event_pusher: Arc<dyn EventPusher>,
}

impl RelayChatMessageUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            repository,
            event_pusher,
        }
    }

    /// Build, store and address a chat message.
    ///
    /// # Returns
    ///
    /// The stored message plus the broadcast targets: all members, sender
    /// included.
    pub async fn execute(
        &self,
        session_id: &SessionId,
        sender_id: &ParticipantId,
        text: MessageText,
    ) -> Result<(ChatMessage, Vec<ParticipantId>), RelayError> {
        let session = match self.repository.get_session(session_id).await {
            Ok(session) => session,
            Err(RepositoryError::SessionNotFound(id)) => {
                return Err(RelayError::SessionNotFound(id));
            }
            Err(e) => return Err(RelayError::BroadcastFailed(e.to_string())),
        };

        let sender = session
            .member(sender_id)
            .ok_or_else(|| RelayError::ParticipantNotFound(sender_id.as_str().to_string()))?;

        let message = ChatMessage::new(
            MessageId::generate(),
            text,
            sender.nickname.clone(),
            sender.avatar.clone(),
            Timestamp::new(get_unix_timestamp()),
        );

        match self.repository.add_message(session_id, message.clone()).await {
            Ok(()) => {}
            Err(RepositoryError::Domain(DomainError::MessageCapacityExceeded)) => {
                return Err(RelayError::MessageRejected("transcript is full".into()));
            }
            Err(e) => return Err(RelayError::BroadcastFailed(e.to_string())),
        }

        // The sender stays in the target list: its transcript append is the
        // server echo, never an optimistic local copy.
        Ok((message, session.member_ids()))
    }

    /// Push the serialized `new-message` to the given members.
    pub async fn broadcast_message(
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pusher::MockEventPusher;
    use crate::domain::{Avatar, Nickname, Participant, Session};
    use crate::infrastructure::repository::InMemorySessionRegistry;

    fn participant(nickname: &str, joined_at: i64) -> Participant {
        Participant::new(
            ParticipantId::generate(),
            Nickname::new(nickname.to_string()).unwrap(),
            Avatar::default(),
            Timestamp::new(joined_at),
        )
    }

    async fn seeded_session(
        repository: &InMemorySessionRegistry,
        names: &[&str],
    ) -> (SessionId, Vec<ParticipantId>) {
        let session_id = SessionId::generate();
        let mut session = Session::new(session_id.clone(), Timestamp::new(1000));
        let mut ids = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let p = participant(name, 1000 + i as i64);
            ids.push(p.id.clone());
            session.add_participant(p).unwrap();
        }
        repository.insert_session(session).await.unwrap();
        (session_id, ids)
    }

    fn text(raw: &str) -> MessageText {
        MessageText::new(raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_message_is_stored_with_sender_identity() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let (session_id, ids) = seeded_session(&repository, &["alice", "bob"]).await;
        let usecase =
            RelayChatMessageUseCase::new(repository.clone(), Arc::new(MockEventPusher::new()));

        // when:
        let (message, _) = usecase
            .execute(&session_id, &ids[0], text("hello"))
            .await
            .unwrap();

        // then:
        assert_eq!(message.sender.as_str(), "alice");
        assert!(!message.id.as_str().is_empty());
        let session = repository.get_session(&session_id).await.unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].text.as_str(), "hello");
    }

    #[tokio::test]
    async fn test_targets_include_the_sender() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let (session_id, ids) = seeded_session(&repository, &["alice", "bob", "charlie"]).await;
        let usecase =
            RelayChatMessageUseCase::new(repository, Arc::new(MockEventPusher::new()));

        // when:
        let (_, targets) = usecase
            .execute(&session_id, &ids[0], text("hello"))
            .await
            .unwrap();

        // then: everyone gets the relay, sender included
        assert_eq!(targets.len(), 3);
        assert!(targets.contains(&ids[0]));
    }

    #[tokio::test]
    async fn test_messages_keep_relay_order_in_transcript() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let (session_id, ids) = seeded_session(&repository, &["alice", "bob"]).await;
        let usecase =
            RelayChatMessageUseCase::new(repository.clone(), Arc::new(MockEventPusher::new()));

        // when: messages from two senders interleave
        usecase
            .execute(&session_id, &ids[0], text("one"))
            .await
            .unwrap();
        usecase
            .execute(&session_id, &ids[1], text("two"))
            .await
            .unwrap();
        usecase
            .execute(&session_id, &ids[0], text("three"))
            .await
            .unwrap();

        // then: the transcript is the processing order
        let session = repository.get_session(&session_id).await.unwrap();
        let texts: Vec<&str> = session.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_message_from_non_member_is_rejected() {
        // given:
        let repository = Arc::new(InMemorySessionRegistry::new());
        let (session_id, _) = seeded_session(&repository, &["alice"]).await;
        let usecase =
            RelayChatMessageUseCase::new(repository, Arc::new(MockEventPusher::new()));

        // when:
        let result = usecase
            .execute(&session_id, &ParticipantId::generate(), text("hello"))
            .await;

        // then:
        assert!(matches!(result, Err(RelayError::ParticipantNotFound(_))));
    }

    #[tokio::test]
    async fn test_full_transcript_rejects_message() {
        // given: transcript capacity 1
        let repository = Arc::new(InMemorySessionRegistry::new());
        let session_id = SessionId::generate();
        let mut session = Session::with_capacity(session_id.clone(), Timestamp::new(1000), 16, 1);
        let alice = participant("alice", 1000);
        let alice_id = alice.id.clone();
        session.add_participant(alice).unwrap();
        repository.insert_session(session).await.unwrap();
        let usecase =
            RelayChatMessageUseCase::new(repository, Arc::new(MockEventPusher::new()));

        usecase
            .execute(&session_id, &alice_id, text("one"))
            .await
            .unwrap();

        // when:
        let result = usecase.execute(&session_id, &alice_id, text("two")).await;

        // then:
        assert!(matches!(result, Err(RelayError::MessageRejected(_))));
    }
}
