//! WebSocket wire protocol for the collaborative timer.
//!
//! Every frame is a JSON object discriminated by a kebab-case `"type"` tag;
//! payload fields are camelCase. The client crate depends on these types
//! directly, so this module is the single source of truth for the protocol.

use serde::{Deserialize, Serialize};

/// Timer phase on the wire: `"study"`, `"shortBreak"`, `"longBreak"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhaseDto {
    Study,
    ShortBreak,
    LongBreak,
}

/// Shared timer snapshot as carried by `timer-action` and `timer-update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStateDto {
    pub is_running: bool,
    pub current_phase: TimerPhaseDto,
    pub time_remaining_seconds: u32,
    pub rounds_completed: u32,
    pub total_rounds: u32,
}

impl Default for TimerStateDto {
    fn default() -> Self {
        Self {
            is_running: false,
            current_phase: TimerPhaseDto::Study,
            time_remaining_seconds: 25 * 60,
            rounds_completed: 0,
            total_rounds: 4,
        }
    }
}

/// Timer action tag attached to a pushed snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerActionKind {
    Start,
    Pause,
    Resume,
    Stop,
    SkipPhase,
    SettingsChange,
    PhaseCompleted,
}

/// Roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    pub nickname: String,
    pub avatar: String,
    pub is_host: bool,
    pub joined_at: i64,
}

/// Relayed chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub text: String,
    pub sender: String,
    pub avatar: String,
    pub timestamp: i64,
}

/// Complete session snapshot, returned on create/join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: String,
    pub participants: Vec<ParticipantDto>,
    pub timer_state: TimerStateDto,
    pub chat: Vec<ChatMessageDto>,
}

/// Identity payload carried by `join-session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantData {
    pub nickname: String,
    pub avatar: String,
}

/// Events sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    CreateSession {
        nickname: String,
        avatar: String,
    },
    JoinSession {
        session_id: String,
        participant_data: ParticipantData,
    },
    LeaveSession,
    TimerAction {
        action: TimerActionKind,
        timer_state: TimerStateDto,
    },
    SendMessage {
        text: String,
    },
}

/// Events sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    CreateSessionAck {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<SessionDto>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    JoinSessionAck {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<SessionDto>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Full roster after a join
    ParticipantJoined {
        participants: Vec<ParticipantDto>,
    },
    /// Full roster after a departure; `newHost` names the promoted member
    /// when the departing participant was the host
    ParticipantLeft {
        participants: Vec<ParticipantDto>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_host: Option<String>,
    },
    TimerUpdate {
        timer_state: TimerStateDto,
    },
    NewMessage {
        id: String,
        text: String,
        sender: String,
        avatar: String,
        timestamp: i64,
    },
}
