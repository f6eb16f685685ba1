//! Client session state machine.
//!
//! `SessionClient` owns the local belief about the connection, the current
//! session (roster, shared timer snapshot, chat transcript) and the local
//! user's identity and role. It is a cloneable handle over shared state; a
//! pump loop feeds it incoming `ServerEvent`s, UI code calls the action
//! methods, and renderers subscribe to a watch channel of [`StateView`]s.
//!
//! `create_session` and `join_session` are the only awaiting operations:
//! each registers a oneshot ack slot, sends its event and waits for the
//! server's answer under an application-level timeout. Everything else is
//! fire-and-forget. Incoming events only mutate the in-memory snapshot; the
//! state machine never re-emits an event it received.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot, watch};

use tomodoro_server::domain::{Avatar, Nickname};
use tomodoro_server::infrastructure::dto::websocket::{
    ChatMessageDto, ClientEvent, ParticipantData, ParticipantDto, ServerEvent, SessionDto,
    TimerStateDto,
};

use crate::bridge::TimerAuthorityBridge;
use crate::channel::EventSink;
use crate::chat::ChatRelay;
use crate::domain::{Role, derive_role};
use crate::engine::TimerSettings;
use crate::error::ClientError;

/// Application-level cap on a create/join round trip; a stuck request
/// surfaces `RequestTimeout` instead of hanging on the transport's timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection/session lifecycle of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    #[default]
    Idle,
    Connecting,
    ConnectedIdle,
    InSession,
}

/// Local copy of the shared session state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub id: String,
    pub participants: Vec<ParticipantDto>,
    pub timer: TimerStateDto,
}

/// Render-ready view published on every state change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateView {
    pub state: ClientState,
    pub role: Option<Role>,
    pub session_id: Option<String>,
    pub participant_count: usize,
    pub unread: u32,
    pub timer: Option<TimerStateDto>,
}

/// What an applied server event changed, for the UI to narrate
#[derive(Debug, Clone, PartialEq)]
pub enum ClientNotification {
    RosterUpdated {
        participants: Vec<ParticipantDto>,
        new_host: Option<String>,
    },
    PromotedToHost,
    TimerUpdated(TimerStateDto),
    MessageReceived(ChatMessageDto),
}

struct AckPayload {
    success: bool,
    session: Option<SessionDto>,
    error: Option<String>,
}

struct Inner {
    state: ClientState,
    nickname: Option<String>,
    session: Option<SessionSnapshot>,
    role: Option<Role>,
    chat: ChatRelay,
    pending: Option<oneshot::Sender<AckPayload>>,
}

/// Cloneable handle to the client session state machine
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<Mutex<Inner>>,
    sink: Arc<dyn EventSink>,
    bridge: TimerAuthorityBridge,
    view_tx: Arc<watch::Sender<StateView>>,
    request_timeout: Duration,
}

impl SessionClient {
    pub fn new(
        sink: Arc<dyn EventSink>,
        bridge: TimerAuthorityBridge,
    ) -> (Self, watch::Receiver<StateView>) {
        let (view_tx, view_rx) = watch::channel(StateView::default());
        let client = Self {
            inner: Arc::new(Mutex::new(Inner {
                state: ClientState::Idle,
                nickname: None,
                session: None,
                role: None,
                chat: ChatRelay::new(),
                pending: None,
            })),
            sink,
            bridge,
            view_tx: Arc::new(view_tx),
            request_timeout: REQUEST_TIMEOUT,
        };
        (client, view_rx)
    }

    /// Shorten the create/join ack timeout (tests)
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub async fn set_connecting(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = ClientState::Connecting;
        self.publish_view(&inner);
    }

    pub async fn set_connected(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = ClientState::ConnectedIdle;
        self.publish_view(&inner);
    }

    /// The channel dropped: forget the session (the registry treats the
    /// disconnect as a departure) and fail any awaiting request.
    pub async fn handle_disconnect(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = ClientState::Idle;
        inner.session = None;
        inner.role = None;
        inner.chat.clear();
        // Dropping the sender fails the oneshot of an awaiting create/join.
        inner.pending = None;
        self.bridge.release_authority();
        self.publish_view(&inner);
    }

    /// Create a session with the local user as host.
    ///
    /// # Returns
    ///
    /// The shareable session id on success; the server's error string,
    /// verbatim, inside [`ClientError::Rejected`] on decline.
    pub async fn create_session(&self, nickname: &str, avatar: &str) -> Result<String, ClientError> {
        let (nickname, avatar) = validate_identity(nickname, avatar)?;

        let rx = self.register_request(&nickname).await?;

        if let Err(e) = self.sink.send(&ClientEvent::CreateSession {
            nickname: nickname.clone(),
            avatar,
        }) {
            self.clear_pending().await;
            return Err(e);
        }

        let ack = self.await_ack(rx).await?;
        let session = ack_session(ack)?;
        let session_id = session.id.clone();
        self.adopt_session(session).await;
        Ok(session_id)
    }

    /// Join an existing session as guest.
    pub async fn join_session(
        &self,
        session_id: &str,
        nickname: &str,
        avatar: &str,
    ) -> Result<(), ClientError> {
        if session_id.trim().is_empty() {
            return Err(ClientError::InvalidInput("session id must not be empty".into()));
        }
        let (nickname, avatar) = validate_identity(nickname, avatar)?;

        let rx = self.register_request(&nickname).await?;

        if let Err(e) = self.sink.send(&ClientEvent::JoinSession {
            session_id: session_id.trim().to_string(),
            participant_data: ParticipantData { nickname, avatar },
        }) {
            self.clear_pending().await;
            return Err(e);
        }

        let ack = self.await_ack(rx).await?;
        let session = ack_session(ack)?;
        self.adopt_session(session).await;
        Ok(())
    }

    /// Leave the current session: optimistic local exit first, then a
    /// fire-and-forget notification. Other members learn of the departure
    /// through the registry's roster broadcast.
    pub async fn leave_session(&self) -> Result<(), ClientError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.state != ClientState::InSession {
                return Err(ClientError::NotInSession);
            }
            inner.session = None;
            inner.role = None;
            inner.chat.clear();
            inner.state = ClientState::ConnectedIdle;
            self.publish_view(&inner);
        }
        self.bridge.release_authority();

        if let Err(e) = self.sink.send(&ClientEvent::LeaveSession) {
            tracing::debug!("leave-session not delivered: {}", e);
        }
        Ok(())
    }

    /// Send a chat message. Empty text is a no-op; the transcript append
    /// happens only when the server echoes the message back.
    pub async fn send_chat(&self, text: &str) -> Result<(), ClientError> {
        {
            let inner = self.inner.lock().await;
            if inner.state != ClientState::InSession {
                return Err(ClientError::NotInSession);
            }
        }

        let Some(prepared) = ChatRelay::prepare_outgoing(text) else {
            return Ok(());
        };

        self.sink.send(&ClientEvent::SendMessage { text: prepared })
    }

    pub async fn set_chat_panel_open(&self, open: bool) {
        let mut inner = self.inner.lock().await;
        inner.chat.set_panel_open(open);
        self.publish_view(&inner);
    }

    pub async fn timer_start(&self) {
        self.host_timer_op(|bridge| bridge.start()).await;
    }

    pub async fn timer_pause(&self) {
        self.host_timer_op(|bridge| bridge.pause()).await;
    }

    pub async fn timer_resume(&self) {
        self.host_timer_op(|bridge| bridge.resume()).await;
    }

    pub async fn timer_stop(&self) {
        self.host_timer_op(|bridge| bridge.stop()).await;
    }

    pub async fn timer_skip_phase(&self) {
        self.host_timer_op(|bridge| bridge.skip_phase()).await;
    }

    pub async fn timer_configure(&self, settings: TimerSettings) {
        self.host_timer_op(move |bridge| bridge.configure(&settings))
            .await;
    }

    /// Apply one incoming server event and report what changed.
    pub async fn apply_server_event(&self, event: ServerEvent) -> Vec<ClientNotification> {
        match event {
            ServerEvent::CreateSessionAck {
                success,
                session,
                error,
                ..
            } => {
                self.resolve_pending(AckPayload {
                    success,
                    session,
                    error,
                })
                .await;
                Vec::new()
            }
            ServerEvent::JoinSessionAck {
                success,
                session,
                error,
            } => {
                self.resolve_pending(AckPayload {
                    success,
                    session,
                    error,
                })
                .await;
                Vec::new()
            }
            ServerEvent::ParticipantJoined { participants } => {
                self.apply_roster(participants, None).await
            }
            ServerEvent::ParticipantLeft {
                participants,
                new_host,
            } => self.apply_roster(participants, new_host).await,
            ServerEvent::TimerUpdate { timer_state } => self.apply_timer_update(timer_state).await,
            ServerEvent::NewMessage {
                id,
                text,
                sender,
                avatar,
                timestamp,
            } => {
                self.apply_new_message(ChatMessageDto {
                    id,
                    text,
                    sender,
                    avatar,
                    timestamp,
                })
                .await
            }
        }
    }

    pub async fn state(&self) -> ClientState {
        self.inner.lock().await.state
    }

    pub async fn role(&self) -> Option<Role> {
        self.inner.lock().await.role
    }

    pub async fn session_view(&self) -> Option<SessionSnapshot> {
        self.inner.lock().await.session.clone()
    }

    pub async fn transcript(&self) -> Vec<ChatMessageDto> {
        self.inner.lock().await.chat.transcript().to_vec()
    }

    pub async fn unread(&self) -> u32 {
        self.inner.lock().await.chat.unread()
    }

    pub async fn chat_panel_open(&self) -> bool {
        self.inner.lock().await.chat.is_panel_open()
    }

    // ---- internals ----

    async fn register_request(
        &self,
        nickname: &str,
    ) -> Result<oneshot::Receiver<AckPayload>, ClientError> {
        if !self.sink.is_connected() {
            return Err(ClientError::NotConnected);
        }

        let mut inner = self.inner.lock().await;
        if inner.state == ClientState::InSession {
            return Err(ClientError::AlreadyInSession);
        }
        if inner.pending.is_some() {
            return Err(ClientError::RequestPending);
        }

        let (tx, rx) = oneshot::channel();
        inner.pending = Some(tx);
        inner.nickname = Some(nickname.to_string());
        Ok(rx)
    }

    async fn clear_pending(&self) {
        self.inner.lock().await.pending = None;
    }

    async fn await_ack(&self, rx: oneshot::Receiver<AckPayload>) -> Result<AckPayload, ClientError> {
        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(ack)) => Ok(ack),
            Ok(Err(_)) => Err(ClientError::ConnectionError(
                "connection lost while waiting for server response".into(),
            )),
            Err(_) => {
                self.clear_pending().await;
                Err(ClientError::RequestTimeout)
            }
        }
    }

    async fn resolve_pending(&self, ack: AckPayload) {
        let mut inner = self.inner.lock().await;
        match inner.pending.take() {
            Some(tx) => {
                if tx.send(ack).is_err() {
                    tracing::debug!("ack arrived after the request was abandoned");
                }
            }
            None => {
                tracing::debug!("unexpected ack with no pending request, ignoring");
            }
        }
    }

    /// Adopt the server's session snapshot wholesale: roster, timer and chat
    /// exactly as returned, no partial adoption.
    async fn adopt_session(&self, dto: SessionDto) {
        let mut inner = self.inner.lock().await;
        let nickname = inner.nickname.clone().unwrap_or_default();
        let role = derive_role(&dto.participants, &nickname);

        inner.chat.adopt_transcript(dto.chat);
        inner.session = Some(SessionSnapshot {
            id: dto.id,
            participants: dto.participants,
            timer: dto.timer_state.clone(),
        });
        inner.role = Some(role);
        inner.state = ClientState::InSession;

        match role {
            Role::Host => self.bridge.adopt_authority(&dto.timer_state),
            Role::Guest => {
                self.bridge.release_authority();
                self.bridge.apply_remote(&dto.timer_state);
            }
        }

        self.publish_view(&inner);
    }

    async fn apply_roster(
        &self,
        participants: Vec<ParticipantDto>,
        new_host: Option<String>,
    ) -> Vec<ClientNotification> {
        let mut inner = self.inner.lock().await;
        if inner.state != ClientState::InSession {
            tracing::debug!("roster push while not in a session, ignoring");
            return Vec::new();
        }

        let nickname = inner.nickname.clone().unwrap_or_default();
        let previous = inner.role;
        let role = derive_role(&participants, &nickname);

        if let Some(session) = inner.session.as_mut() {
            session.participants = participants.clone();
        }
        inner.role = Some(role);

        let mut notifications = vec![ClientNotification::RosterUpdated {
            participants,
            new_host,
        }];

        if previous == Some(Role::Guest) && role == Role::Host {
            // Promotion: continue from the last known shared snapshot so the
            // timer does not visibly jump.
            let last_known = inner
                .session
                .as_ref()
                .map(|s| s.timer.clone())
                .unwrap_or_default();
            self.bridge.adopt_authority(&last_known);
            notifications.push(ClientNotification::PromotedToHost);
        } else if role == Role::Guest && self.bridge.is_authorized() {
            // The latest roster is the single source of truth, in both
            // directions.
            self.bridge.release_authority();
        }

        self.publish_view(&inner);
        notifications
    }

    async fn apply_timer_update(&self, timer_state: TimerStateDto) -> Vec<ClientNotification> {
        let mut inner = self.inner.lock().await;
        if inner.state != ClientState::InSession {
            tracing::debug!("timer-update while not in a session, ignoring");
            return Vec::new();
        }

        if inner.role == Some(Role::Host) {
            // The host's engine is the writer; stale remote snapshots from
            // an authority handover window are dropped.
            tracing::debug!("host ignoring remote timer-update");
            return Vec::new();
        }

        if let Some(session) = inner.session.as_mut() {
            session.timer = timer_state.clone();
        }
        self.bridge.apply_remote(&timer_state);

        self.publish_view(&inner);
        vec![ClientNotification::TimerUpdated(timer_state)]
    }

    async fn apply_new_message(&self, message: ChatMessageDto) -> Vec<ClientNotification> {
        let mut inner = self.inner.lock().await;
        if inner.state != ClientState::InSession {
            tracing::debug!("new-message while not in a session, ignoring");
            return Vec::new();
        }

        inner.chat.apply_incoming(message.clone());
        self.publish_view(&inner);
        vec![ClientNotification::MessageReceived(message)]
    }

    async fn host_timer_op(&self, op: impl FnOnce(&TimerAuthorityBridge)) {
        // Authority check is the first guard: a guest's call is a no-op.
        {
            let inner = self.inner.lock().await;
            if inner.role != Some(Role::Host) {
                return;
            }
        }

        op(&self.bridge);

        let snapshot = self.bridge.snapshot();
        let mut inner = self.inner.lock().await;
        if let Some(session) = inner.session.as_mut() {
            session.timer = snapshot;
        }
        self.publish_view(&inner);
    }

    fn publish_view(&self, inner: &Inner) {
        let view = StateView {
            state: inner.state,
            role: inner.role,
            session_id: inner.session.as_ref().map(|s| s.id.clone()),
            participant_count: inner
                .session
                .as_ref()
                .map(|s| s.participants.len())
                .unwrap_or(0),
            unread: inner.chat.unread(),
            timer: inner.session.as_ref().map(|s| s.timer.clone()),
        };
        let _ = self.view_tx.send(view);
    }
}

fn validate_identity(nickname: &str, avatar: &str) -> Result<(String, String), ClientError> {
    let nickname = Nickname::new(nickname.to_string())
        .map_err(|e| ClientError::InvalidInput(e.to_string()))?;
    let avatar =
        Avatar::new(avatar.to_string()).map_err(|e| ClientError::InvalidInput(e.to_string()))?;
    Ok((
        nickname.into_string(),
        avatar.into_string(),
    ))
}

fn ack_session(ack: AckPayload) -> Result<SessionDto, ClientError> {
    if !ack.success {
        return Err(ClientError::Rejected(
            ack.error.unwrap_or_else(|| "request rejected".to_string()),
        ));
    }
    ack.session.ok_or_else(|| {
        ClientError::ConnectionError("ack missing the session snapshot".into())
    })
}
