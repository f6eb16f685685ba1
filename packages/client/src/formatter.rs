//! Terminal output formatting for the CLI client.

use tomodoro_server::infrastructure::dto::websocket::{
    ChatMessageDto, ParticipantDto, TimerPhaseDto, TimerStateDto,
};
use tomodoro_shared::time::timestamp_to_rfc3339;

use crate::channel::ConnectionState;

/// Formats session events for the terminal
pub struct MessageFormatter;

impl MessageFormatter {
    /// Render remaining time as `mm:ss`
    pub fn format_clock(total_seconds: u32) -> String {
        format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }

    fn phase_label(phase: TimerPhaseDto) -> &'static str {
        match phase {
            TimerPhaseDto::Study => "study",
            TimerPhaseDto::ShortBreak => "short break",
            TimerPhaseDto::LongBreak => "long break",
        }
    }

    /// One-line timer status, e.g. `[24:10] study (running) round 1/4`
    pub fn format_timer(state: &TimerStateDto) -> String {
        format!(
            "[{}] {} ({}) round {}/{}\n",
            Self::format_clock(state.time_remaining_seconds),
            Self::phase_label(state.current_phase),
            if state.is_running { "running" } else { "paused" },
            state.rounds_completed,
            state.total_rounds,
        )
    }

    /// Roster listing, host marked with a star
    pub fn format_roster(participants: &[ParticipantDto]) -> String {
        let mut output = format!("--- {} participant(s) ---\n", participants.len());
        for p in participants {
            output.push_str(&format!(
                "  {} {} ({})\n",
                if p.is_host { "*" } else { " " },
                p.nickname,
                p.avatar,
            ));
        }
        output
    }

    pub fn format_chat_message(message: &ChatMessageDto) -> String {
        format!(
            "[{}] {}: {}\n",
            timestamp_to_rfc3339(message.timestamp),
            message.sender,
            message.text,
        )
    }

    pub fn format_session_created(session_id: &str, invite_link: &str) -> String {
        format!(
            "Session created: {}\nShare this invite link: {}\n",
            session_id, invite_link,
        )
    }

    pub fn format_roster_update(participants: &[ParticipantDto], new_host: Option<&str>) -> String {
        let mut output = Self::format_roster(participants);
        if let Some(new_host) = new_host {
            output.push_str(&format!(">>> {} is now the host\n", new_host));
        }
        output
    }

    pub fn format_promotion() -> String {
        ">>> You are now the host. The shared timer is yours to drive.\n".to_string()
    }

    pub fn format_connection_state(state: ConnectionState) -> String {
        match state {
            ConnectionState::Connecting => "(connecting...)\n".to_string(),
            ConnectionState::Connected => "(connected)\n".to_string(),
            ConnectionState::Disconnected => "(connection lost, reconnecting...)\n".to_string(),
            ConnectionState::ClosedByServer => "(connection closed by server)\n".to_string(),
        }
    }

    pub fn format_unread(unread: u32) -> String {
        format!("({} unread message(s), /chat to open)\n", unread)
    }
}
