//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    CreateSessionUseCase, JoinSessionUseCase, LeaveSessionUseCase, QuerySessionsUseCase,
    RelayChatMessageUseCase, RelayTimerActionUseCase,
};

use super::{
    handler::{get_session_detail, get_sessions, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Session registry server
///
/// Encapsulates the wired usecases and runs the axum application.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     create_session_usecase,
///     join_session_usecase,
///     leave_session_usecase,
///     relay_timer_action_usecase,
///     relay_chat_message_usecase,
///     query_sessions_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    create_session_usecase: Arc<CreateSessionUseCase>,
    join_session_usecase: Arc<JoinSessionUseCase>,
    leave_session_usecase: Arc<LeaveSessionUseCase>,
    relay_timer_action_usecase: Arc<RelayTimerActionUseCase>,
    relay_chat_message_usecase: Arc<RelayChatMessageUseCase>,
    query_sessions_usecase: Arc<QuerySessionsUseCase>,
}

impl Server {
    pub fn new(
        create_session_usecase: Arc<CreateSessionUseCase>,
        join_session_usecase: Arc<JoinSessionUseCase>,
        leave_session_usecase: Arc<LeaveSessionUseCase>,
        relay_timer_action_usecase: Arc<RelayTimerActionUseCase>,
        relay_chat_message_usecase: Arc<RelayChatMessageUseCase>,
        query_sessions_usecase: Arc<QuerySessionsUseCase>,
    ) -> Self {
        Self {
            create_session_usecase,
            join_session_usecase,
            leave_session_usecase,
            relay_timer_action_usecase,
            relay_chat_message_usecase,
            query_sessions_usecase,
        }
    }

    /// Run the session registry server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            create_session_usecase: self.create_session_usecase,
            join_session_usecase: self.join_session_usecase,
            leave_session_usecase: self.leave_session_usecase,
            relay_timer_action_usecase: self.relay_timer_action_usecase,
            relay_chat_message_usecase: self.relay_chat_message_usecase,
            query_sessions_usecase: self.query_sessions_usecase,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket endpoint
            .route("/ws", get(websocket_handler))
            // HTTP endpoints
            .route("/api/health", get(health_check))
            .route("/api/sessions", get(get_sessions))
            .route("/api/sessions/{session_id}", get(get_session_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Session registry listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
