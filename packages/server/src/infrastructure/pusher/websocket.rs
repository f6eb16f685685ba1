//! WebSocket-backed `EventPusher` implementation.
//!
//! The WebSocket itself is created and split in the UI layer
//! (`ui/handler/websocket.rs`); this implementation only holds the
//! per-connection `UnboundedSender` halves, keyed by participant id, and
//! pushes serialized events through them.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{EventPushError, EventPusher, ParticipantId, PusherChannel};

/// `EventPusher` over per-connection unbounded sender channels
pub struct WebSocketEventPusher {
    /// Key: participant id (String)
    clients: Arc<Mutex<HashMap<String, PusherChannel>>>,
}

impl WebSocketEventPusher {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for WebSocketEventPusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
    async fn register_client(&self, participant_id: ParticipantId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(participant_id.as_str().to_string(), sender);
        tracing::debug!(
            "Client '{}' registered to EventPusher",
            participant_id.as_str()
        );
    }

    async fn unregister_client(&self, participant_id: &ParticipantId) {
        let mut clients = self.clients.lock().await;
        clients.remove(participant_id.as_str());
        tracing::debug!(
            "Client '{}' unregistered from EventPusher",
            participant_id.as_str()
        );
    }

    async fn push_to(
        &self,
        participant_id: &ParticipantId,
        content: &str,
    ) -> Result<(), EventPushError> {
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(participant_id.as_str()) {
            sender
                .send(content.to_string())
                .map_err(|e| EventPushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed event to client '{}'", participant_id.as_str());
            Ok(())
        } else {
            Err(EventPushError::ClientNotFound(
                participant_id.as_str().to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        content: &str,
    ) -> Result<(), EventPushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            if let Some(sender) = clients.get(target.as_str()) {
                // Partial delivery failures are tolerated on broadcast.
                if let Err(e) = sender.send(content.to_string()) {
                    tracing::warn!(
                        "Failed to push event to client '{}': {}",
                        target.as_str(),
                        e
                    );
                } else {
                    tracing::debug!("Broadcasted event to client '{}'", target.as_str());
                }
            } else {
                tracing::warn!(
                    "Client '{}' not found during broadcast, skipping",
                    target.as_str()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn create_test_pusher() -> WebSocketEventPusher {
        WebSocketEventPusher::new()
    }

    fn participant_id(raw: &str) -> ParticipantId {
        ParticipantId::new(raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // given:
        let pusher = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let alice = participant_id("alice");
        pusher.register_client(alice.clone(), tx).await;

        // when:
        let result = pusher.push_to(&alice, "hello").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // given:
        let pusher = create_test_pusher();
        let ghost = participant_id("ghost");

        // when:
        let result = pusher.push_to(&ghost, "hello").await;

        // then:
        assert!(matches!(
            result,
            Err(EventPushError::ClientNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_targets() {
        // given:
        let pusher = create_test_pusher();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let alice = participant_id("alice");
        let bob = participant_id("bob");
        pusher.register_client(alice.clone(), tx1).await;
        pusher.register_client(bob.clone(), tx2).await;

        // when:
        let result = pusher.broadcast(vec![alice, bob], "update").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("update".to_string()));
        assert_eq!(rx2.recv().await, Some("update".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_missing_targets() {
        // given:
        let pusher = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let alice = participant_id("alice");
        pusher.register_client(alice.clone(), tx).await;

        // when:
        let result = pusher
            .broadcast(vec![alice, participant_id("ghost")], "update")
            .await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("update".to_string()));
    }

    #[tokio::test]
    async fn test_unregister_removes_channel() {
        // given:
        let pusher = create_test_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();
        let alice = participant_id("alice");
        pusher.register_client(alice.clone(), tx).await;

        // when:
        pusher.unregister_client(&alice).await;

        // then:
        assert!(matches!(
            pusher.push_to(&alice, "hello").await,
            Err(EventPushError::ClientNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // given:
        let pusher = create_test_pusher();

        // when:
        let result = pusher.broadcast(vec![], "update").await;

        // then:
        assert!(result.is_ok());
    }
}
