//! Chat relay: transcript and unread tracking.
//!
//! The transcript is append-only and fed exclusively by server echoes; a
//! sent message shows up only when the registry relays it back, which is
//! what keeps every client on the single server-side order.

use tomodoro_server::domain::value_object::MAX_MESSAGE_CHARS;
use tomodoro_server::infrastructure::dto::websocket::ChatMessageDto;

/// Local chat state of one client
pub struct ChatRelay {
    transcript: Vec<ChatMessageDto>,
    unread: u32,
    panel_open: bool,
}

impl ChatRelay {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            unread: 0,
            panel_open: false,
        }
    }

    /// Prepare outgoing text: trim, drop when empty, truncate to the
    /// protocol's 200-character cap at a character boundary.
    pub fn prepare_outgoing(text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.chars().take(MAX_MESSAGE_CHARS).collect())
    }

    /// Adopt a transcript wholesale (join: the server snapshot is ground truth)
    pub fn adopt_transcript(&mut self, transcript: Vec<ChatMessageDto>) {
        self.transcript = transcript;
        self.unread = 0;
    }

    /// Append an incoming message; counts as unread while the panel is closed
    pub fn apply_incoming(&mut self, message: ChatMessageDto) {
        self.transcript.push(message);
        if !self.panel_open {
            self.unread += 1;
        }
    }

    /// Open or close the chat panel; opening clears the unread counter
    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
        if open {
            self.unread = 0;
        }
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn unread(&self) -> u32 {
        self.unread
    }

    pub fn transcript(&self) -> &[ChatMessageDto] {
        &self.transcript
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
        self.unread = 0;
    }
}

impl Default for ChatRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, text: &str) -> ChatMessageDto {
        ChatMessageDto {
            id: id.to_string(),
            text: text.to_string(),
            sender: "alice".to_string(),
            avatar: "cat".to_string(),
            timestamp: 1000,
        }
    }

    #[test]
    fn test_prepare_outgoing_trims_whitespace() {
        // given:
        let raw = "  hello  ";

        // when:
        let prepared = ChatRelay::prepare_outgoing(raw);

        // then:
        assert_eq!(prepared, Some("hello".to_string()));
    }

    #[test]
    fn test_prepare_outgoing_drops_empty_text() {
        // given:
        let raw = "   \n ";

        // when:
        let prepared = ChatRelay::prepare_outgoing(raw);

        // then:
        assert_eq!(prepared, None);
    }

    #[test]
    fn test_prepare_outgoing_truncates_to_two_hundred_chars() {
        // given:
        let raw = "x".repeat(250);

        // when:
        let prepared = ChatRelay::prepare_outgoing(&raw).unwrap();

        // then:
        assert_eq!(prepared.chars().count(), 200);
    }

    #[test]
    fn test_prepare_outgoing_truncates_at_character_boundaries() {
        // given: multibyte input longer than the cap
        let raw = "あ".repeat(250);

        // when:
        let prepared = ChatRelay::prepare_outgoing(&raw).unwrap();

        // then:
        assert_eq!(prepared.chars().count(), 200);
        assert!(prepared.chars().all(|c| c == 'あ'));
    }

    #[test]
    fn test_incoming_messages_keep_delivery_order() {
        // given:
        let mut relay = ChatRelay::new();

        // when:
        relay.apply_incoming(message("m1", "one"));
        relay.apply_incoming(message("m2", "two"));
        relay.apply_incoming(message("m3", "three"));

        // then:
        let ids: Vec<&str> = relay.transcript().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_unread_counts_messages_while_panel_closed() {
        // given:
        let mut relay = ChatRelay::new();

        // when:
        relay.apply_incoming(message("m1", "one"));
        relay.apply_incoming(message("m2", "two"));
        relay.apply_incoming(message("m3", "three"));

        // then:
        assert_eq!(relay.unread(), 3);
    }

    #[test]
    fn test_opening_panel_resets_unread() {
        // given:
        let mut relay = ChatRelay::new();
        relay.apply_incoming(message("m1", "one"));

        // when:
        relay.set_panel_open(true);

        // then:
        assert_eq!(relay.unread(), 0);
    }

    #[test]
    fn test_messages_while_panel_open_never_count_as_unread() {
        // given:
        let mut relay = ChatRelay::new();
        relay.set_panel_open(true);

        // when:
        relay.apply_incoming(message("m1", "one"));
        relay.apply_incoming(message("m2", "two"));

        // then:
        assert_eq!(relay.unread(), 0);
    }

    #[test]
    fn test_closing_panel_resumes_unread_counting() {
        // given:
        let mut relay = ChatRelay::new();
        relay.set_panel_open(true);
        relay.apply_incoming(message("m1", "one"));

        // when:
        relay.set_panel_open(false);
        relay.apply_incoming(message("m2", "two"));

        // then:
        assert_eq!(relay.unread(), 1);
    }

    #[test]
    fn test_adopt_transcript_replaces_and_clears_unread() {
        // given:
        let mut relay = ChatRelay::new();
        relay.apply_incoming(message("old", "stale"));

        // when:
        relay.adopt_transcript(vec![message("m1", "one"), message("m2", "two")]);

        // then:
        assert_eq!(relay.transcript().len(), 2);
        assert_eq!(relay.transcript()[0].id, "m1");
        assert_eq!(relay.unread(), 0);
    }
}
