//! Session registry for the tomodoro collaborative pomodoro timer.
//!
//! The registry holds one record per active session, processes
//! create/join/leave/timer-action/chat events from clients and rebroadcasts
//! state to all session members over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
