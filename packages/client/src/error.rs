//! Error types for the tomodoro client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The channel is not connected; session actions fail fast
    #[error("not connected to the server")]
    NotConnected,

    /// Transport-level failure
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// The server closed the connection; auto-retry is suppressed
    #[error("connection closed by server")]
    ClosedByServer,

    /// A create/join request got no ack within the application timeout
    #[error("request timed out")]
    RequestTimeout,

    /// The server declined a create/join request; carries the server's
    /// error string verbatim
    #[error("{0}")]
    Rejected(String),

    /// A create/join request is already awaiting its ack
    #[error("a request is already pending")]
    RequestPending,

    /// The operation requires session membership
    #[error("not in a session")]
    NotInSession,

    /// The operation requires the client to be outside a session
    #[error("already in a session")]
    AlreadyInSession,

    /// Locally rejected input (empty nickname, unknown avatar, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
