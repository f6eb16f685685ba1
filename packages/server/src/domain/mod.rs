//! Domain layer: entities, value objects and the interfaces the registry
//! needs from the outer layers.

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, Departure, Participant, Session, TimerPhase, TimerSnapshot};
pub use error::{DomainError, EventPushError, RepositoryError};
pub use pusher::{EventPusher, PusherChannel};
pub use repository::SessionRepository;
pub use value_object::{Avatar, MessageId, MessageText, Nickname, ParticipantId, SessionId, Timestamp};
