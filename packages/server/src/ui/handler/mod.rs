//! axum request handlers.

pub mod http;
pub mod websocket;

pub use http::{get_session_detail, get_sessions, health_check};
pub use websocket::websocket_handler;
