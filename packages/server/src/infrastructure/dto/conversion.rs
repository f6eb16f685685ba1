//! Conversion logic between wire DTOs and domain entities.

use crate::domain::{
    ChatMessage, Participant, Session, TimerPhase, TimerSnapshot,
};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<TimerPhase> for dto::TimerPhaseDto {
    fn from(phase: TimerPhase) -> Self {
        match phase {
            TimerPhase::Study => dto::TimerPhaseDto::Study,
            TimerPhase::ShortBreak => dto::TimerPhaseDto::ShortBreak,
            TimerPhase::LongBreak => dto::TimerPhaseDto::LongBreak,
        }
    }
}

impl From<TimerSnapshot> for dto::TimerStateDto {
    fn from(snapshot: TimerSnapshot) -> Self {
        Self {
            is_running: snapshot.is_running,
            current_phase: snapshot.current_phase.into(),
            time_remaining_seconds: snapshot.time_remaining_seconds,
            rounds_completed: snapshot.rounds_completed,
            total_rounds: snapshot.total_rounds,
        }
    }
}

impl From<Participant> for dto::ParticipantDto {
    fn from(model: Participant) -> Self {
        Self {
            id: model.id.into_string(),
            nickname: model.nickname.into_string(),
            avatar: model.avatar.into_string(),
            is_host: model.is_host,
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<ChatMessage> for dto::ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.into_string(),
            text: model.text.into_string(),
            sender: model.sender.into_string(),
            avatar: model.avatar.into_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<Session> for dto::SessionDto {
    fn from(model: Session) -> Self {
        Self {
            id: model.id.into_string(),
            participants: model.participants.into_iter().map(Into::into).collect(),
            timer_state: model.timer.into(),
            chat: model.messages.into_iter().map(Into::into).collect(),
        }
    }
}

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::TimerPhaseDto> for TimerPhase {
    fn from(phase: dto::TimerPhaseDto) -> Self {
        match phase {
            dto::TimerPhaseDto::Study => TimerPhase::Study,
            dto::TimerPhaseDto::ShortBreak => TimerPhase::ShortBreak,
            dto::TimerPhaseDto::LongBreak => TimerPhase::LongBreak,
        }
    }
}

impl From<dto::TimerStateDto> for TimerSnapshot {
    fn from(dto: dto::TimerStateDto) -> Self {
        Self {
            is_running: dto.is_running,
            current_phase: dto.current_phase.into(),
            time_remaining_seconds: dto.time_remaining_seconds,
            rounds_completed: dto.rounds_completed,
            total_rounds: dto.total_rounds,
        }
    }
}
