//! Error types for the usecase layer.
//!
//! Create/join errors become the `error` string of the ack the client sees,
//! so their display text is user-facing. The relay errors never reach a
//! client: timer actions and chat sends are silent-drop operations, the
//! handler only logs them.

use thiserror::Error;

use crate::domain::{DomainError, RepositoryError};

/// Session creation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CreateError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Join failures, mapped to the ack error strings the client shows verbatim
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("session not found")]
    SessionNotFound(String),

    #[error("session is full")]
    SessionFull,

    #[error("nickname '{0}' is already taken in this session")]
    NicknameTaken(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// Leave failures; the departure itself is fire-and-forget for the client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LeaveError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("participant '{0}' not found")]
    ParticipantNotFound(String),
}

/// Timer/chat relay failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// A non-host attempted a timer mutation; dropped without notice
    #[error("participant '{0}' is not the host")]
    NotHost(String),

    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("participant '{0}' not found")]
    ParticipantNotFound(String),

    #[error("message rejected: {0}")]
    MessageRejected(String),

    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),
}
