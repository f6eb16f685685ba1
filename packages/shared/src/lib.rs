//! Shared utilities for the tomodoro collaborative timer.
//!
//! This crate holds the pieces both the server and the client binaries need:
//! timestamp handling with a clock abstraction, and tracing setup.

pub mod logger;
pub mod time;
