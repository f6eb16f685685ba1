//! Session registry server for the tomodoro collaborative timer.
//!
//! Holds shared pomodoro sessions, arbitrates timer authority and relays
//! chat between all members of a session.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tomodoro-server
//! cargo run --bin tomodoro-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use tomodoro_server::{
    infrastructure::{pusher::WebSocketEventPusher, repository::InMemorySessionRegistry},
    ui::Server,
    usecase::{
        CreateSessionUseCase, JoinSessionUseCase, LeaveSessionUseCase, QuerySessionsUseCase,
        RelayChatMessageUseCase, RelayTimerActionUseCase,
    },
};
use tomodoro_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tomodoro-server")]
#[command(about = "Session registry for the tomodoro collaborative timer", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. EventPusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory session registry)
    let repository = Arc::new(InMemorySessionRegistry::new());

    // 2. Create EventPusher (WebSocket implementation)
    let event_pusher = Arc::new(WebSocketEventPusher::new());

    // 3. Create UseCases
    let create_session_usecase = Arc::new(CreateSessionUseCase::new(
        repository.clone(),
        event_pusher.clone(),
    ));
    let join_session_usecase = Arc::new(JoinSessionUseCase::new(
        repository.clone(),
        event_pusher.clone(),
    ));
    let leave_session_usecase = Arc::new(LeaveSessionUseCase::new(
        repository.clone(),
        event_pusher.clone(),
    ));
    let relay_timer_action_usecase = Arc::new(RelayTimerActionUseCase::new(
        repository.clone(),
        event_pusher.clone(),
    ));
    let relay_chat_message_usecase = Arc::new(RelayChatMessageUseCase::new(
        repository.clone(),
        event_pusher.clone(),
    ));
    let query_sessions_usecase = Arc::new(QuerySessionsUseCase::new(repository.clone()));

    // 4. Create and run the server
    let server = Server::new(
        create_session_usecase,
        join_session_usecase,
        leave_session_usecase,
        relay_timer_action_usecase,
        relay_chat_message_usecase,
        query_sessions_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
