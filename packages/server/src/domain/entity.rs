//! Entities for the session registry.
//!
//! `Session` owns the invariants the rest of the system relies on: exactly
//! one host per session, participants unique by id and nickname, and atomic
//! host handover when the host departs. All mutation goes through methods on
//! the entity; callers never flip `is_host` themselves.

use serde::Serialize;

use super::error::DomainError;
use super::value_object::{Avatar, MessageId, MessageText, Nickname, ParticipantId, SessionId, Timestamp};

/// Default participant cap per session
pub const DEFAULT_PARTICIPANT_CAPACITY: usize = 16;

/// Default chat transcript cap per session
pub const DEFAULT_MESSAGE_CAPACITY: usize = 500;

/// Pomodoro phase of the shared timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerPhase {
    Study,
    ShortBreak,
    LongBreak,
}

/// Complete point-in-time copy of the shared timer state, pushed wholesale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub is_running: bool,
    pub current_phase: TimerPhase,
    pub time_remaining_seconds: u32,
    pub rounds_completed: u32,
    pub total_rounds: u32,
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self {
            is_running: false,
            current_phase: TimerPhase::Study,
            time_remaining_seconds: 25 * 60,
            rounds_completed: 0,
            total_rounds: 4,
        }
    }
}

/// A member of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub nickname: Nickname,
    pub avatar: Avatar,
    pub is_host: bool,
    pub joined_at: Timestamp,
}

impl Participant {
    /// Create a non-host participant; `Session::add_participant` decides the
    /// host flag.
    pub fn new(id: ParticipantId, nickname: Nickname, avatar: Avatar, joined_at: Timestamp) -> Self {
        Self {
            id,
            nickname,
            avatar,
            is_host: false,
            joined_at,
        }
    }
}

/// A relayed chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: MessageText,
    pub sender: Nickname,
    pub avatar: Avatar,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(
        id: MessageId,
        text: MessageText,
        sender: Nickname,
        avatar: Avatar,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            text,
            sender,
            avatar,
            timestamp,
        }
    }
}

/// Result of removing a participant from a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Roster after the removal, in join order
    pub participants: Vec<Participant>,
    /// Newly elected host, set only when the departing member was the host
    /// and other members remain
    pub new_host: Option<Participant>,
}

/// A shared pomodoro session: roster, timer snapshot and chat transcript
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: SessionId,
    /// Insertion order = join order
    pub participants: Vec<Participant>,
    pub timer: TimerSnapshot,
    pub messages: Vec<ChatMessage>,
    pub created_at: Timestamp,
    #[serde(skip)]
    participant_capacity: usize,
    #[serde(skip)]
    message_capacity: usize,
}

impl Session {
    pub fn new(id: SessionId, created_at: Timestamp) -> Self {
        Self::with_capacity(
            id,
            created_at,
            DEFAULT_PARTICIPANT_CAPACITY,
            DEFAULT_MESSAGE_CAPACITY,
        )
    }

    pub fn with_capacity(
        id: SessionId,
        created_at: Timestamp,
        participant_capacity: usize,
        message_capacity: usize,
    ) -> Self {
        Self {
            id,
            participants: Vec::new(),
            timer: TimerSnapshot::default(),
            messages: Vec::new(),
            created_at,
            participant_capacity,
            message_capacity,
        }
    }

    /// Add a participant, enforcing the caps and the uniqueness rules.
    ///
    /// The first participant of a session becomes the host; everyone after
    /// joins as guest. The caller-supplied `is_host` flag is ignored.
    pub fn add_participant(&mut self, mut participant: Participant) -> Result<(), DomainError> {
        if self.participants.len() >= self.participant_capacity {
            return Err(DomainError::SessionCapacityExceeded);
        }
        if self.participants.iter().any(|p| p.id == participant.id) {
            return Err(DomainError::DuplicateParticipant(
                participant.id.as_str().to_string(),
            ));
        }
        if self
            .participants
            .iter()
            .any(|p| p.nickname == participant.nickname)
        {
            return Err(DomainError::NicknameTaken(
                participant.nickname.as_str().to_string(),
            ));
        }

        participant.is_host = self.participants.is_empty();
        self.participants.push(participant);
        Ok(())
    }

    /// Remove a participant. When the host departs and members remain, the
    /// earliest remaining joiner is promoted in the same mutation, so no
    /// observer ever sees a roster with zero or two hosts.
    ///
    /// Returns `None` when the participant was not a member (idempotent).
    pub fn remove_participant(&mut self, participant_id: &ParticipantId) -> Option<Departure> {
        let index = self
            .participants
            .iter()
            .position(|p| &p.id == participant_id)?;

        let removed = self.participants.remove(index);

        let mut new_host = None;
        if removed.is_host && !self.participants.is_empty() {
            // Election policy: earliest remaining joiner.
            self.participants[0].is_host = true;
            new_host = Some(self.participants[0].clone());
        }

        Some(Departure {
            participants: self.participants.clone(),
            new_host,
        })
    }

    /// Replace the shared timer snapshot wholesale
    pub fn apply_timer(&mut self, snapshot: TimerSnapshot) {
        self.timer = snapshot;
    }

    /// Append a chat message, enforcing the transcript cap
    pub fn add_message(&mut self, message: ChatMessage) -> Result<(), DomainError> {
        if self.messages.len() >= self.message_capacity {
            return Err(DomainError::MessageCapacityExceeded);
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn host(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_host)
    }

    pub fn is_host(&self, participant_id: &ParticipantId) -> bool {
        self.host().map(|h| &h.id == participant_id).unwrap_or(false)
    }

    pub fn member(&self, participant_id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == participant_id)
    }

    pub fn member_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    #[cfg(test)]
    fn host_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_host).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(nickname: &str, joined_at: i64) -> Participant {
        Participant::new(
            ParticipantId::generate(),
            Nickname::new(nickname.to_string()).unwrap(),
            Avatar::default(),
            Timestamp::new(joined_at),
        )
    }

    fn session() -> Session {
        Session::new(SessionId::generate(), Timestamp::new(1000))
    }

    fn message(sender: &str, text: &str, at: i64) -> ChatMessage {
        ChatMessage::new(
            MessageId::generate(),
            MessageText::new(text.to_string()).unwrap(),
            Nickname::new(sender.to_string()).unwrap(),
            Avatar::default(),
            Timestamp::new(at),
        )
    }

    #[test]
    fn test_first_participant_becomes_host() {
        // given:
        let mut session = session();

        // when:
        session.add_participant(participant("alice", 1000)).unwrap();

        // then:
        assert_eq!(session.participants.len(), 1);
        assert!(session.participants[0].is_host);
        assert_eq!(session.host().unwrap().nickname.as_str(), "alice");
    }

    #[test]
    fn test_later_participants_join_as_guests() {
        // given:
        let mut session = session();
        session.add_participant(participant("alice", 1000)).unwrap();

        // when:
        session.add_participant(participant("bob", 2000)).unwrap();

        // then:
        assert!(!session.participants[1].is_host);
        assert_eq!(session.host_count(), 1);
    }

    #[test]
    fn test_caller_supplied_host_flag_is_ignored() {
        // given:
        let mut session = session();
        session.add_participant(participant("alice", 1000)).unwrap();
        let mut intruder = participant("mallory", 2000);
        intruder.is_host = true;

        // when:
        session.add_participant(intruder).unwrap();

        // then:
        assert_eq!(session.host_count(), 1);
        assert_eq!(session.host().unwrap().nickname.as_str(), "alice");
    }

    #[test]
    fn test_nickname_collision_is_rejected() {
        // given:
        let mut session = session();
        session.add_participant(participant("alice", 1000)).unwrap();

        // when:
        let result = session.add_participant(participant("alice", 2000));

        // then:
        assert_eq!(
            result,
            Err(DomainError::NicknameTaken("alice".to_string()))
        );
        assert_eq!(session.participants.len(), 1);
    }

    #[test]
    fn test_participant_capacity_is_enforced() {
        // given:
        let mut session =
            Session::with_capacity(SessionId::generate(), Timestamp::new(1000), 2, 100);
        session.add_participant(participant("alice", 1000)).unwrap();
        session.add_participant(participant("bob", 2000)).unwrap();

        // when:
        let result = session.add_participant(participant("charlie", 3000));

        // then:
        assert_eq!(result, Err(DomainError::SessionCapacityExceeded));
    }

    #[test]
    fn test_host_departure_promotes_earliest_remaining_joiner() {
        // given:
        let mut session = session();
        let alice = participant("alice", 1000);
        let alice_id = alice.id.clone();
        session.add_participant(alice).unwrap();
        session.add_participant(participant("bob", 2000)).unwrap();
        session.add_participant(participant("charlie", 3000)).unwrap();

        // when:
        let departure = session.remove_participant(&alice_id).unwrap();

        // then:
        let new_host = departure.new_host.unwrap();
        assert_eq!(new_host.nickname.as_str(), "bob");
        assert!(new_host.is_host);
        assert_eq!(session.host_count(), 1);
        assert_eq!(session.host().unwrap().nickname.as_str(), "bob");
    }

    #[test]
    fn test_guest_departure_elects_no_new_host() {
        // given:
        let mut session = session();
        session.add_participant(participant("alice", 1000)).unwrap();
        let bob = participant("bob", 2000);
        let bob_id = bob.id.clone();
        session.add_participant(bob).unwrap();

        // when:
        let departure = session.remove_participant(&bob_id).unwrap();

        // then:
        assert!(departure.new_host.is_none());
        assert_eq!(session.host().unwrap().nickname.as_str(), "alice");
    }

    #[test]
    fn test_removing_last_participant_leaves_empty_session() {
        // given:
        let mut session = session();
        let alice = participant("alice", 1000);
        let alice_id = alice.id.clone();
        session.add_participant(alice).unwrap();

        // when:
        let departure = session.remove_participant(&alice_id).unwrap();

        // then:
        assert!(departure.new_host.is_none());
        assert!(departure.participants.is_empty());
        assert!(session.is_empty());
    }

    #[test]
    fn test_removing_unknown_participant_is_idempotent() {
        // given:
        let mut session = session();
        session.add_participant(participant("alice", 1000)).unwrap();

        // when:
        let departure = session.remove_participant(&ParticipantId::generate());

        // then:
        assert!(departure.is_none());
        assert_eq!(session.participants.len(), 1);
    }

    #[test]
    fn test_single_host_invariant_across_join_leave_sequences() {
        // given: a churn of joins and leaves, including two host departures
        let mut session = session();
        let mut ids = Vec::new();
        for (i, name) in ["alice", "bob", "charlie", "dave"].iter().enumerate() {
            let p = participant(name, 1000 + i as i64);
            ids.push(p.id.clone());
            session.add_participant(p).unwrap();
        }

        // when / then: at most one host at every observed roster
        session.remove_participant(&ids[0]).unwrap(); // host leaves
        assert_eq!(session.host_count(), 1);

        session.remove_participant(&ids[2]).unwrap(); // guest leaves
        assert_eq!(session.host_count(), 1);

        session.remove_participant(&ids[1]).unwrap(); // host leaves again
        assert_eq!(session.host_count(), 1);
        assert_eq!(session.host().unwrap().nickname.as_str(), "dave");
    }

    #[test]
    fn test_timer_snapshot_defaults_to_idle_study_phase() {
        // given:

        // when:
        let snapshot = TimerSnapshot::default();

        // then:
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.current_phase, TimerPhase::Study);
        assert_eq!(snapshot.time_remaining_seconds, 25 * 60);
        assert_eq!(snapshot.rounds_completed, 0);
        assert_eq!(snapshot.total_rounds, 4);
    }

    #[test]
    fn test_apply_timer_replaces_snapshot_wholesale() {
        // given:
        let mut session = session();
        let snapshot = TimerSnapshot {
            is_running: true,
            current_phase: TimerPhase::ShortBreak,
            time_remaining_seconds: 180,
            rounds_completed: 2,
            total_rounds: 4,
        };

        // when:
        session.apply_timer(snapshot.clone());

        // then:
        assert_eq!(session.timer, snapshot);
    }

    #[test]
    fn test_message_capacity_is_enforced() {
        // given:
        let mut session =
            Session::with_capacity(SessionId::generate(), Timestamp::new(1000), 16, 2);
        session.add_message(message("alice", "one", 1)).unwrap();
        session.add_message(message("alice", "two", 2)).unwrap();

        // when:
        let result = session.add_message(message("alice", "three", 3));

        // then:
        assert_eq!(result, Err(DomainError::MessageCapacityExceeded));
        assert_eq!(session.messages.len(), 2);
    }

    #[test]
    fn test_transcript_preserves_append_order() {
        // given:
        let mut session = session();

        // when:
        session.add_message(message("alice", "first", 1)).unwrap();
        session.add_message(message("bob", "second", 2)).unwrap();
        session.add_message(message("alice", "third", 3)).unwrap();

        // then:
        let texts: Vec<&str> = session.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
