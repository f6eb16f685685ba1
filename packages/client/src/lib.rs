//! Client core for the tomodoro collaborative pomodoro timer.
//!
//! The pieces:
//! - [`channel`]: auto-reconnecting WebSocket transport with observable
//!   connection state
//! - [`state`]: the client session state machine (create/join/leave, roster,
//!   chat transcript, role)
//! - [`bridge`]: the timer authority bridge keeping exactly one writer of
//!   the shared timer state
//! - [`engine`]: the local countdown engine guests and hosts both run
//! - [`chat`]: transcript and unread tracking
//! - [`identity`]: avatar persistence across restarts
//! - [`invite`]: invite link building and parsing
//! - [`runner`]: the interactive CLI front end

pub mod bridge;
pub mod channel;
pub mod chat;
pub mod domain;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod identity;
pub mod invite;
pub mod runner;
pub mod state;
pub mod ui;
