//! Invite link handling.
//!
//! An invite is the application URL carrying the session id as a `join`
//! query parameter. After consuming an invite the parameter is stripped from
//! the visible URL so a refresh does not re-trigger the join flow.

/// Query parameter carrying the session id
pub const JOIN_PARAM: &str = "join";

/// Build a shareable invite link
pub fn build_invite_link(base_url: &str, session_id: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{JOIN_PARAM}={session_id}")
}

/// Extract a session id from user input: either an invite link carrying a
/// `join` parameter, or a bare session id.
pub fn extract_session_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    match input.split_once('?') {
        Some((_, query)) => query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == JOIN_PARAM)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty()),
        // No query string: a URL without a join parameter carries no id, a
        // bare token is the id itself.
        None => {
            if input.contains('/') {
                None
            } else {
                Some(input.to_string())
            }
        }
    }
}

/// Remove the `join` parameter from a URL, keeping everything else
pub fn strip_join_param(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let remaining: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            pair.split_once('=')
                .map(|(key, _)| key != JOIN_PARAM)
                .unwrap_or(true)
        })
        .collect();

    if remaining.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, remaining.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_invite_link_appends_join_param() {
        // given:
        let base = "https://tomodoro.app";

        // when:
        let link = build_invite_link(base, "abc123");

        // then:
        assert_eq!(link, "https://tomodoro.app?join=abc123");
    }

    #[test]
    fn test_build_invite_link_extends_existing_query() {
        // given:
        let base = "https://tomodoro.app?theme=dark";

        // when:
        let link = build_invite_link(base, "abc123");

        // then:
        assert_eq!(link, "https://tomodoro.app?theme=dark&join=abc123");
    }

    #[test]
    fn test_extract_session_id_from_invite_link() {
        // given:
        let link = "https://tomodoro.app?join=abc123";

        // when:
        let id = extract_session_id(link);

        // then:
        assert_eq!(id, Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_session_id_among_other_params() {
        // given:
        let link = "https://tomodoro.app?theme=dark&join=abc123&lang=en";

        // when:
        let id = extract_session_id(link);

        // then:
        assert_eq!(id, Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_session_id_from_bare_id() {
        // given:
        let input = "abc123";

        // when:
        let id = extract_session_id(input);

        // then:
        assert_eq!(id, Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_session_id_from_url_without_param_fails() {
        // given:
        let input = "https://tomodoro.app/about";

        // when:
        let id = extract_session_id(input);

        // then:
        assert_eq!(id, None);
    }

    #[test]
    fn test_extract_session_id_from_empty_input_fails() {
        // given:
        let input = "   ";

        // when:
        let id = extract_session_id(input);

        // then:
        assert_eq!(id, None);
    }

    #[test]
    fn test_extract_session_id_with_empty_value_fails() {
        // given:
        let input = "https://tomodoro.app?join=";

        // when:
        let id = extract_session_id(input);

        // then:
        assert_eq!(id, None);
    }

    #[test]
    fn test_strip_join_param_removes_only_the_join_pair() {
        // given:
        let url = "https://tomodoro.app?theme=dark&join=abc123&lang=en";

        // when:
        let stripped = strip_join_param(url);

        // then:
        assert_eq!(stripped, "https://tomodoro.app?theme=dark&lang=en");
    }

    #[test]
    fn test_strip_join_param_drops_empty_query() {
        // given:
        let url = "https://tomodoro.app?join=abc123";

        // when:
        let stripped = strip_join_param(url);

        // then:
        assert_eq!(stripped, "https://tomodoro.app");
    }

    #[test]
    fn test_strip_join_param_keeps_url_without_query() {
        // given:
        let url = "https://tomodoro.app/about";

        // when:
        let stripped = strip_join_param(url);

        // then:
        assert_eq!(stripped, url);
    }

    #[test]
    fn test_build_then_extract_round_trips() {
        // given:
        let link = build_invite_link("https://tomodoro.app", "xyz789");

        // when:
        let id = extract_session_id(&link);

        // then:
        assert_eq!(id, Some("xyz789".to_string()));
    }
}
