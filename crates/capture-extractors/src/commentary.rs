//! Short-lived commentary messages shown on the leaderboard.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// How long a message stays on screen.
pub const MESSAGE_DISPLAY_SECS: f64 = 5.0;

#[derive(Debug, Clone)]
struct Message {
    time: f64,
    text: String,
}

/// Buffer of timestamped messages. Clones share the buffer: the pit stop
/// recorder writes, the leaderboard capture reads.
#[derive(Debug, Clone)]
pub struct CommentaryMessages {
    messages: Arc<Mutex<Vec<Message>>>,
    display_secs: f64,
}

impl Default for CommentaryMessages {
    fn default() -> Self {
        Self::new(MESSAGE_DISPLAY_SECS)
    }
}

impl CommentaryMessages {
    pub fn new(display_secs: f64) -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            display_secs,
        }
    }

    pub fn add(&self, text: impl Into<String>, elapsed: Duration) {
        self.messages.lock().push(Message {
            time: elapsed.as_secs_f64(),
            text: text.into(),
        });
    }

    /// Messages on screen at `elapsed`, oldest first. Expired messages are
    /// discarded.
    pub fn active(&self, elapsed: Duration) -> Vec<String> {
        let now = elapsed.as_secs_f64();
        let mut messages = self.messages.lock();
        messages.retain(|m| now < m.time + self.display_secs);
        messages
            .iter()
            .filter(|m| m.time <= now)
            .map(|m| m.text.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn messages_expire_after_display_window() -> TestResult {
        let commentary = CommentaryMessages::default();
        commentary.add("#10 pitting", Duration::from_secs(10));

        assert!(commentary.active(Duration::from_secs(9)).is_empty());
        assert_eq!(commentary.active(Duration::from_secs(12)), vec!["#10 pitting"]);
        assert!(commentary.active(Duration::from_secs(15)).is_empty());
        Ok(())
    }
}
