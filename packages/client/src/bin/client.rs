//! CLI client for the tomodoro collaborative pomodoro timer.
//!
//! Connects to a session registry, then drives a shared session from the
//! terminal: `/create` starts a session and prints an invite link, `/join`
//! enters one, timer commands (`/start`, `/pause`, ...) work for the host,
//! and any other input is sent as chat. Automatically reconnects on
//! disconnection (bounded attempts with fixed backoff).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tomodoro-client -- --nickname alice
//! cargo run --bin tomodoro-client -- -n bob --join "https://tomodoro.app?join=<session id>"
//! ```

use std::path::PathBuf;

use clap::Parser;

use tomodoro_client::runner::{ClientOptions, run_client};
use tomodoro_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tomodoro-client")]
#[command(about = "CLI client for the tomodoro collaborative pomodoro timer", long_about = None)]
struct Args {
    /// Display name for this session (1-20 characters)
    #[arg(short = 'n', long)]
    nickname: String,

    /// Avatar identifier; defaults to the one remembered from the last run
    #[arg(short = 'a', long)]
    avatar: Option<String>,

    /// Session id or invite link to join on startup
    #[arg(short = 'j', long)]
    join: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Identity store path (defaults to ~/.tomodoro/identity.json)
    #[arg(long)]
    store: Option<PathBuf>,
}

fn default_store_path() -> PathBuf {
    let mut path = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push(".tomodoro");
    path.push("identity.json");
    path
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let options = ClientOptions {
        url: args.url,
        nickname: args.nickname,
        avatar: args.avatar,
        invite: args.join,
        store_path: args.store.unwrap_or_else(default_store_path),
    };

    // Run the client
    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
