//! Data Transfer Objects (DTOs) for the session registry.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event DTOs (the wire protocol, shared with the client crate)
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
