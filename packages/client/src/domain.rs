//! Domain logic for client-side decisions.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use tomodoro_server::infrastructure::dto::websocket::ParticipantDto;

use crate::channel::ConnectionState;

/// The local client's role within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Authorized to mutate the shared timer
    Host,
    /// Applies timer snapshots read-only
    Guest,
}

/// Derive the local role from a roster broadcast.
///
/// There is no dedicated "you are now host" message: the role is inferred
/// from the latest roster alone, which makes the detection robust against
/// reordered or duplicated pushes. The local client is host exactly when the
/// roster entry flagged `is_host` carries its nickname.
pub fn derive_role(participants: &[ParticipantDto], local_nickname: &str) -> Role {
    let is_host = participants
        .iter()
        .any(|p| p.is_host && p.nickname == local_nickname);

    if is_host { Role::Host } else { Role::Guest }
}

/// Check whether the runner should attempt another connection.
///
/// # Arguments
///
/// * `state` - the connection state observed when the session ended
/// * `current_attempt` - the current reconnection attempt count (0-indexed)
/// * `max_attempts` - the maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    state: ConnectionState,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // A server-initiated close is terminal.
    if state == ConnectionState::ClosedByServer {
        return false;
    }

    current_attempt < max_attempts
}
