//! Client execution logic: connection lifecycle plus the interactive loop.
//!
//! `run_client` is the composition root on the client side: it wires the
//! channel, engine, bridge and state machine together, then drives one
//! session per connection. When a connection drops it reconnects with a
//! bounded attempt count and fixed backoff, except after a server-initiated
//! close.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use tomodoro_server::domain::Avatar;

use crate::bridge::{ChannelPublisher, TimerAuthorityBridge};
use crate::channel::{
    ConnectionState, EventSink, MAX_RECONNECT_ATTEMPTS, RECONNECT_INTERVAL_SECS, SocketChannel,
};
use crate::domain::should_attempt_reconnect;
use crate::engine::{LocalCountdown, TimerSettings};
use crate::formatter::MessageFormatter;
use crate::identity::{FileStore, load_avatar, remember_avatar};
use crate::invite::{build_invite_link, extract_session_id, strip_join_param};
use crate::state::{ClientNotification, ClientState, SessionClient};
use crate::ui::redisplay_prompt;

/// Base application URL used when printing invite links
pub const INVITE_BASE_URL: &str = "https://tomodoro.app";

/// Client configuration assembled by the binary
pub struct ClientOptions {
    pub url: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub invite: Option<String>,
    pub store_path: PathBuf,
}

enum SessionOutcome {
    UserExit,
    Lost(ConnectionState),
}

/// Run the client with reconnection logic
pub async fn run_client(options: ClientOptions) -> Result<(), Box<dyn std::error::Error>> {
    // Avatar persists across restarts; the nickname is entered fresh.
    let store = FileStore::new(options.store_path.clone());
    let avatar = options
        .avatar
        .clone()
        .or_else(|| load_avatar(&store))
        .unwrap_or_else(|| Avatar::default().as_str().to_string());
    remember_avatar(&store, &avatar);

    // An invite is consumed exactly once, not re-triggered per reconnect.
    let mut invite = options.invite.clone();

    let mut reconnect_count = 0;
    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            options.url,
            options.nickname,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_session(&options, &avatar, invite.take()).await {
            Ok(SessionOutcome::UserExit) => {
                tracing::info!("Client session ended normally");
                break;
            }
            Ok(SessionOutcome::Lost(state)) => {
                reconnect_count += 1;
                if !should_attempt_reconnect(state, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    if state == ConnectionState::ClosedByServer {
                        tracing::error!("Server closed the connection. Exiting.");
                    } else {
                        tracing::error!(
                            "Failed to reconnect after {} attempts. Exiting.",
                            MAX_RECONNECT_ATTEMPTS
                        );
                    }
                    std::process::exit(1);
                }
                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
            Err(e) => {
                tracing::warn!("Connection failed: {}", e);
                reconnect_count += 1;
                if !should_attempt_reconnect(
                    ConnectionState::Disconnected,
                    reconnect_count,
                    MAX_RECONNECT_ATTEMPTS,
                ) {
                    tracing::error!(
                        "Failed to connect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    std::process::exit(1);
                }
                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}

/// Drive one connection: wire the components, process events and input
/// until the user exits or the connection drops.
async fn run_session(
    options: &ClientOptions,
    avatar: &str,
    invite: Option<String>,
) -> Result<SessionOutcome, crate::error::ClientError> {
    let (channel, mut events) = SocketChannel::connect(&options.url).await?;
    let mut conn_rx = channel.state();
    let sink: Arc<dyn EventSink> = Arc::new(channel);

    // Composition: engine and state machine are joined only through the
    // bridge's publisher/engine seams.
    let engine = LocalCountdown::new();
    let publisher = Arc::new(ChannelPublisher::new(sink.clone()));
    let bridge = TimerAuthorityBridge::new(Arc::new(engine), publisher);
    bridge.wire_phase_completion();

    let (client, mut view_rx) = SessionClient::new(sink, bridge);
    client.set_connected().await;

    println!(
        "\nYou are '{}' ({}). /create starts a session, /join <id> joins one, /quit exits.\n",
        options.nickname, avatar
    );

    // A pre-filled invite triggers the join flow immediately.
    if let Some(link) = invite {
        match extract_session_id(&link) {
            Some(session_id) => {
                tracing::debug!(
                    "Invite consumed; canonical url: {}",
                    strip_join_param(&link)
                );
                match client
                    .join_session(&session_id, &options.nickname, avatar)
                    .await
                {
                    Ok(()) => {
                        if let Some(view) = client.session_view().await {
                            print!("{}", MessageFormatter::format_roster(&view.participants));
                            print!("{}", MessageFormatter::format_timer(&view.timer));
                        }
                    }
                    Err(e) => println!("Join failed: {}", e),
                }
            }
            None => println!("Invite link carries no session id: {}", link),
        }
    }

    // Blocking thread for rustyline (synchronous readline)
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt_nickname = options.nickname.clone();
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", prompt_nickname);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        rl.add_history_entry(&line).ok();
                        if input_tx.send(line).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    let _ = input_tx.send("/quit".to_string());
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    let _ = input_tx.send("/quit".to_string());
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            maybe_event = events.recv() => match maybe_event {
                Some(event) => {
                    let notifications = client.apply_server_event(event).await;
                    print_notifications(&client, &notifications).await;
                }
                None => {
                    // Inbound stream ended: the connection is gone.
                    client.handle_disconnect().await;
                    let state = *conn_rx.borrow();
                    return Ok(SessionOutcome::Lost(state));
                }
            },
            maybe_line = input_rx.recv() => match maybe_line {
                Some(line) => {
                    if handle_line(&client, options, avatar, &line).await {
                        return Ok(SessionOutcome::UserExit);
                    }
                }
                None => return Ok(SessionOutcome::UserExit),
            },
            changed = conn_rx.changed() => {
                if changed.is_err() {
                    return Ok(SessionOutcome::Lost(ConnectionState::Disconnected));
                }
                let state = *conn_rx.borrow();
                print!("{}", MessageFormatter::format_connection_state(state));
                if state == ConnectionState::Disconnected
                    || state == ConnectionState::ClosedByServer
                {
                    client.handle_disconnect().await;
                    return Ok(SessionOutcome::Lost(state));
                }
            },
            _ = view_rx.changed() => {
                let unread = view_rx.borrow().unread;
                redisplay_prompt(&options.nickname, unread);
            },
        }
    }
}

async fn print_notifications(client: &SessionClient, notifications: &[ClientNotification]) {
    for notification in notifications {
        match notification {
            ClientNotification::RosterUpdated {
                participants,
                new_host,
            } => {
                print!(
                    "\n{}",
                    MessageFormatter::format_roster_update(participants, new_host.as_deref())
                );
            }
            ClientNotification::PromotedToHost => {
                print!("\n{}", MessageFormatter::format_promotion());
            }
            ClientNotification::TimerUpdated(timer_state) => {
                print!("\n{}", MessageFormatter::format_timer(timer_state));
            }
            ClientNotification::MessageReceived(message) => {
                if client.chat_panel_open().await {
                    print!("\n{}", MessageFormatter::format_chat_message(message));
                } else {
                    print!("\n{}", MessageFormatter::format_unread(client.unread().await));
                }
            }
        }
    }
}

/// Handle one input line. Returns `true` when the user wants to exit.
async fn handle_line(
    client: &SessionClient,
    options: &ClientOptions,
    avatar: &str,
    line: &str,
) -> bool {
    let line = line.trim();

    match line {
        "/quit" | "/exit" => {
            if client.state().await == ClientState::InSession {
                let _ = client.leave_session().await;
            }
            return true;
        }
        "/create" => {
            match client.create_session(&options.nickname, avatar).await {
                Ok(session_id) => {
                    let link = build_invite_link(INVITE_BASE_URL, &session_id);
                    print!(
                        "{}",
                        MessageFormatter::format_session_created(&session_id, &link)
                    );
                }
                Err(e) => println!("Create failed: {}", e),
            }
        }
        "/leave" => match client.leave_session().await {
            Ok(()) => println!("Left the session."),
            Err(e) => println!("{}", e),
        },
        "/start" => client.timer_start().await,
        "/pause" => client.timer_pause().await,
        "/resume" => client.timer_resume().await,
        "/stop" => client.timer_stop().await,
        "/skip" => client.timer_skip_phase().await,
        "/chat" => {
            let open = !client.chat_panel_open().await;
            client.set_chat_panel_open(open).await;
            if open {
                println!("--- chat ---");
                for message in client.transcript().await {
                    print!("{}", MessageFormatter::format_chat_message(&message));
                }
            } else {
                println!("(chat closed)");
            }
        }
        "/who" => match client.session_view().await {
            Some(view) => print!("{}", MessageFormatter::format_roster(&view.participants)),
            None => println!("Not in a session."),
        },
        "/timer" => match client.session_view().await {
            Some(view) => print!("{}", MessageFormatter::format_timer(&view.timer)),
            None => println!("Not in a session."),
        },
        "/invite" => match client.session_view().await {
            Some(view) => println!("{}", build_invite_link(INVITE_BASE_URL, &view.id)),
            None => println!("Not in a session."),
        },
        _ if line.starts_with("/join") => {
            let arg = line.trim_start_matches("/join").trim();
            match extract_session_id(arg) {
                Some(session_id) => {
                    match client
                        .join_session(&session_id, &options.nickname, avatar)
                        .await
                    {
                        Ok(()) => {
                            if let Some(view) = client.session_view().await {
                                print!(
                                    "{}",
                                    MessageFormatter::format_roster(&view.participants)
                                );
                                print!("{}", MessageFormatter::format_timer(&view.timer));
                            }
                        }
                        Err(e) => println!("Join failed: {}", e),
                    }
                }
                None => println!("Usage: /join <session id or invite link>"),
            }
        }
        _ if line.starts_with("/settings") => {
            match parse_settings(line.trim_start_matches("/settings")) {
                Some(settings) => client.timer_configure(settings).await,
                None => {
                    println!("Usage: /settings <study min> <short break min> <long break min> <rounds>");
                }
            }
        }
        _ if line.starts_with('/') => println!("Unknown command: {}", line),
        text => {
            if let Err(e) = client.send_chat(text).await {
                println!("{}", e);
            }
            // No local echo: the message shows up when the server relays it.
        }
    }

    false
}

fn parse_settings(args: &str) -> Option<TimerSettings> {
    let numbers: Vec<u32> = args
        .split_whitespace()
        .map(|token| token.parse().ok())
        .collect::<Option<Vec<u32>>>()?;

    let [study_min, short_min, long_min, rounds] = numbers.as_slice() else {
        return None;
    };
    if *study_min == 0 || *short_min == 0 || *long_min == 0 || *rounds == 0 {
        return None;
    }

    Some(TimerSettings {
        study_secs: study_min * 60,
        short_break_secs: short_min * 60,
        long_break_secs: long_min * 60,
        total_rounds: *rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_reads_minutes_and_rounds() {
        // given:
        let args = " 50 10 20 2 ";

        // when:
        let settings = parse_settings(args).unwrap();

        // then:
        assert_eq!(settings.study_secs, 50 * 60);
        assert_eq!(settings.short_break_secs, 10 * 60);
        assert_eq!(settings.long_break_secs, 20 * 60);
        assert_eq!(settings.total_rounds, 2);
    }

    #[test]
    fn test_parse_settings_rejects_wrong_arity() {
        // given:

        // when / then:
        assert!(parse_settings("25 5").is_none());
        assert!(parse_settings("25 5 15 4 9").is_none());
        assert!(parse_settings("").is_none());
    }

    #[test]
    fn test_parse_settings_rejects_non_numeric_input() {
        // given:
        let args = "25 five 15 4";

        // when / then:
        assert!(parse_settings(args).is_none());
    }

    #[test]
    fn test_parse_settings_rejects_zero_durations() {
        // given:
        let args = "0 5 15 4";

        // when / then:
        assert!(parse_settings(args).is_none());
    }
}
