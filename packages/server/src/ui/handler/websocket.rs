//! WebSocket connection handler.
//!
//! One connection serves one client for its whole lifetime: the client
//! connects session-less, then establishes membership through
//! `create-session` or `join-session` events. The handler owns the
//! connection's membership; a socket that drops while in a session runs the
//! same departure path as an explicit `leave-session`.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{Avatar, MessageText, Nickname, ParticipantId, PusherChannel, SessionId, TimerSnapshot},
    infrastructure::dto::websocket::{
        ChatMessageDto, ClientEvent, ParticipantDto, ServerEvent, SessionDto, TimerActionKind,
        TimerStateDto,
    },
    ui::state::AppState,
    usecase::RelayError,
};

/// Session membership of one connection
struct Membership {
    session_id: SessionId,
    participant_id: ParticipantId,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Spawns a task that receives serialized events from the rx channel and
/// pushes them to the WebSocket sender.
///
/// This handles the outbound flow: acks addressed to this client and
/// broadcasts from other session members both arrive through the same
/// channel, so the client observes them in relay order.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Channel through which everything addressed to this client is pushed
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let send_task = pusher_loop(rx, sender);

    let mut membership: Option<Membership> = None;

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error: {}", e);
                break;
            }
        };

        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => handle_client_event(&state, &tx, &mut membership, event).await,
                Err(e) => {
                    tracing::warn!("Failed to parse client event: {} (payload: {})", e, text);
                }
            },
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Client requested close");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    // Disconnect without an explicit leave is treated as leave.
    if membership.is_some() {
        handle_leave(&state, &mut membership).await;
    }
}

async fn handle_client_event(
    state: &Arc<AppState>,
    tx: &PusherChannel,
    membership: &mut Option<Membership>,
    event: ClientEvent,
) {
    match event {
        ClientEvent::CreateSession { nickname, avatar } => {
            handle_create(state, tx, membership, nickname, avatar).await;
        }
        ClientEvent::JoinSession {
            session_id,
            participant_data,
        } => {
            handle_join(
                state,
                tx,
                membership,
                session_id,
                participant_data.nickname,
                participant_data.avatar,
            )
            .await;
        }
        ClientEvent::LeaveSession => {
            handle_leave(state, membership).await;
        }
        ClientEvent::TimerAction {
            action,
            timer_state,
        } => {
            handle_timer_action(state, membership, action, timer_state).await;
        }
        ClientEvent::SendMessage { text } => {
            handle_send_message(state, membership, text).await;
        }
    }
}

/// Serialize and push an event to this connection's own channel
fn send_event(tx: &PusherChannel, event: &ServerEvent) {
    let json = serde_json::to_string(event).unwrap();
    if tx.send(json).is_err() {
        tracing::warn!("Failed to queue event for client (connection gone)");
    }
}

fn create_rejected(tx: &PusherChannel, error: String) {
    send_event(
        tx,
        &ServerEvent::CreateSessionAck {
            success: false,
            session_id: None,
            session: None,
            error: Some(error),
        },
    );
}

fn join_rejected(tx: &PusherChannel, error: String) {
    send_event(
        tx,
        &ServerEvent::JoinSessionAck {
            success: false,
            session: None,
            error: Some(error),
        },
    );
}

async fn handle_create(
    state: &Arc<AppState>,
    tx: &PusherChannel,
    membership: &mut Option<Membership>,
    nickname: String,
    avatar: String,
) {
    if membership.is_some() {
        create_rejected(tx, "already in a session".to_string());
        return;
    }

    let nickname = match Nickname::new(nickname) {
        Ok(nickname) => nickname,
        Err(e) => {
            create_rejected(tx, e.to_string());
            return;
        }
    };
    let avatar = match Avatar::new(avatar) {
        Ok(avatar) => avatar,
        Err(e) => {
            create_rejected(tx, e.to_string());
            return;
        }
    };

    match state
        .create_session_usecase
        .execute(nickname, avatar, tx.clone())
        .await
    {
        Ok((session, participant_id)) => {
            *membership = Some(Membership {
                session_id: session.id.clone(),
                participant_id,
            });

            let dto: SessionDto = session.into();
            send_event(
                tx,
                &ServerEvent::CreateSessionAck {
                    success: true,
                    session_id: Some(dto.id.clone()),
                    session: Some(dto),
                    error: None,
                },
            );
        }
        Err(e) => {
            tracing::warn!("Session creation failed: {}", e);
            create_rejected(tx, e.to_string());
        }
    }
}

async fn handle_join(
    state: &Arc<AppState>,
    tx: &PusherChannel,
    membership: &mut Option<Membership>,
    session_id: String,
    nickname: String,
    avatar: String,
) {
    if membership.is_some() {
        join_rejected(tx, "already in a session".to_string());
        return;
    }

    let session_id = match SessionId::new(session_id) {
        Ok(session_id) => session_id,
        Err(_) => {
            join_rejected(tx, "session not found".to_string());
            return;
        }
    };
    let nickname = match Nickname::new(nickname) {
        Ok(nickname) => nickname,
        Err(e) => {
            join_rejected(tx, e.to_string());
            return;
        }
    };
    let avatar = match Avatar::new(avatar) {
        Ok(avatar) => avatar,
        Err(e) => {
            join_rejected(tx, e.to_string());
            return;
        }
    };

    match state
        .join_session_usecase
        .execute(session_id, nickname, avatar, tx.clone())
        .await
    {
        Ok((session, participant_id)) => {
            *membership = Some(Membership {
                session_id: session.id.clone(),
                participant_id: participant_id.clone(),
            });

            // The joiner adopts the full snapshot from the ack; the existing
            // members get the full roster.
            let dto: SessionDto = session.clone().into();
            let roster = dto.participants.clone();
            send_event(
                tx,
                &ServerEvent::JoinSessionAck {
                    success: true,
                    session: Some(dto),
                    error: None,
                },
            );

            let joined = ServerEvent::ParticipantJoined {
                participants: roster,
            };
            let json = serde_json::to_string(&joined).unwrap();
            if let Err(e) = state
                .join_session_usecase
                .broadcast_participant_joined(&session, &participant_id, &json)
                .await
            {
                tracing::warn!("Failed to broadcast participant-joined: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!("Join failed: {}", e);
            join_rejected(tx, e.to_string());
        }
    }
}

async fn handle_leave(state: &Arc<AppState>, membership: &mut Option<Membership>) {
    let Some(m) = membership.take() else {
        tracing::debug!("leave-session from a client not in a session, ignoring");
        return;
    };

    match state
        .leave_session_usecase
        .execute(&m.session_id, &m.participant_id)
        .await
    {
        Ok(departure) => {
            let participants: Vec<ParticipantDto> = departure
                .participants
                .iter()
                .cloned()
                .map(Into::into)
                .collect();
            let new_host = departure
                .new_host
                .as_ref()
                .map(|p| p.nickname.as_str().to_string());

            let left = ServerEvent::ParticipantLeft {
                participants,
                new_host,
            };
            let json = serde_json::to_string(&left).unwrap();
            if let Err(e) = state
                .leave_session_usecase
                .broadcast_participant_left(&departure, &json)
                .await
            {
                tracing::warn!("Failed to broadcast participant-left: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!("Leave failed: {}", e);
        }
    }
}

async fn handle_timer_action(
    state: &Arc<AppState>,
    membership: &Option<Membership>,
    action: TimerActionKind,
    timer_state: TimerStateDto,
) {
    let Some(m) = membership.as_ref() else {
        tracing::debug!("timer-action from a client not in a session, ignoring");
        return;
    };

    let snapshot: TimerSnapshot = timer_state.clone().into();
    match state
        .relay_timer_action_usecase
        .execute(&m.session_id, &m.participant_id, snapshot)
        .await
    {
        Ok(targets) => {
            tracing::debug!(
                "Relaying timer action {:?} for session '{}'",
                action,
                m.session_id.as_str()
            );
            let update = ServerEvent::TimerUpdate { timer_state };
            let json = serde_json::to_string(&update).unwrap();
            if let Err(e) = state
                .relay_timer_action_usecase
                .broadcast_timer_update(targets, &json)
                .await
            {
                tracing::warn!("Failed to broadcast timer-update: {}", e);
            }
        }
        Err(RelayError::NotHost(id)) => {
            // Guests never hold timer authority; silently drop.
            tracing::debug!("Dropped timer action from non-host '{}'", id);
        }
        Err(e) => {
            tracing::warn!("Timer relay failed: {}", e);
        }
    }
}

async fn handle_send_message(
    state: &Arc<AppState>,
    membership: &Option<Membership>,
    text: String,
) {
    let Some(m) = membership.as_ref() else {
        tracing::debug!("send-message from a client not in a session, ignoring");
        return;
    };

    let text = match MessageText::new(text) {
        Ok(text) => text,
        Err(e) => {
            // Chat sends have no error channel; invalid input is dropped.
            tracing::warn!("Dropped chat message: {}", e);
            return;
        }
    };

    match state
        .relay_chat_message_usecase
        .execute(&m.session_id, &m.participant_id, text)
        .await
    {
        Ok((message, targets)) => {
            let dto: ChatMessageDto = message.into();
            let event = ServerEvent::NewMessage {
                id: dto.id,
                text: dto.text,
                sender: dto.sender,
                avatar: dto.avatar,
                timestamp: dto.timestamp,
            };
            let json = serde_json::to_string(&event).unwrap();
            if let Err(e) = state
                .relay_chat_message_usecase
                .broadcast_message(targets, &json)
                .await
            {
                tracing::warn!("Failed to broadcast new-message: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!("Chat relay failed: {}", e);
        }
    }
}
