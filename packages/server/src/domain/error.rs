//! Error types for the domain layer.

use thiserror::Error;

/// Validation and invariant violations raised by entities and value objects
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Nickname is empty or longer than the allowed 20 characters
    #[error("invalid nickname: {0}")]
    InvalidNickname(String),

    /// Avatar identifier is not part of the closed avatar set
    #[error("unknown avatar '{0}'")]
    InvalidAvatar(String),

    /// Chat message text is empty or longer than 200 characters
    #[error("invalid message text: {0}")]
    InvalidMessageText(String),

    /// Identifier value is empty
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// A participant with the same id is already in the session
    #[error("participant '{0}' is already in the session")]
    DuplicateParticipant(String),

    /// Another participant already uses this nickname in the session
    #[error("nickname '{0}' is already taken in this session")]
    NicknameTaken(String),

    /// Session participant cap reached
    #[error("session is full")]
    SessionCapacityExceeded,

    /// Chat transcript cap reached
    #[error("chat transcript is full")]
    MessageCapacityExceeded,
}

/// Errors raised by `SessionRepository` implementations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// No session with the given id exists
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    /// The participant is not a member of the session
    #[error("participant '{0}' not found")]
    ParticipantNotFound(String),

    /// A domain rule rejected the mutation
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Errors raised by `EventPusher` implementations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventPushError {
    /// No registered channel for the participant
    #[error("client '{0}' not registered")]
    ClientNotFound(String),

    /// The underlying channel rejected the message
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
