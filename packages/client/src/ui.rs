//! Terminal prompt helpers.

use std::io::{self, Write};

/// Re-print the input prompt after asynchronous output interrupted it.
pub fn redisplay_prompt(nickname: &str, unread: u32) {
    if unread > 0 {
        print!("{} [{}]> ", nickname, unread);
    } else {
        print!("{}> ", nickname);
    }
    let _ = io::stdout().flush();
}
