//! Event pusher trait for delivering serialized events to connected clients.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::EventPushError;
use super::value_object::ParticipantId;

/// Channel used to push serialized events to one client connection
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Outbound event delivery interface used by the usecase layer.
///
/// The WebSocket connection itself is created in the UI layer; this trait
/// only manages the per-connection sender halves and pushes content through
/// them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPusher: Send + Sync {
    /// Register a client's sender channel under its participant id
    async fn register_client(&self, participant_id: ParticipantId, sender: PusherChannel);

    /// Remove a client's sender channel
    async fn unregister_client(&self, participant_id: &ParticipantId);

    /// Push a serialized event to a single client
    async fn push_to(
        &self,
        participant_id: &ParticipantId,
        content: &str,
    ) -> Result<(), EventPushError>;

    /// Push a serialized event to each of the given clients.
    ///
    /// Partial delivery failures are tolerated; a client whose channel is
    /// gone is skipped.
    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        content: &str,
    ) -> Result<(), EventPushError>;
}
