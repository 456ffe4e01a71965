//! Focus restoration.

use replay_director_capture_core::{CaptureResult, FocusRestorer, Hotkey};
use tracing::info;

/// Logs the hotkey instead of sending it, for hosts without keyboard
/// automation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFocusRestorer;

impl FocusRestorer for LoggingFocusRestorer {
    fn send_hotkey(&self, hotkey: Hotkey) -> CaptureResult<()> {
        info!(key = ?hotkey.key, modifier = ?hotkey.modifier, "Focus hotkey requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn logging_restorer_always_succeeds() -> TestResult {
        LoggingFocusRestorer.send_hotkey(Hotkey::ALT_TAB)?;
        Ok(())
    }
}
