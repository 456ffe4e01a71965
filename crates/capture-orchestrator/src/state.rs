//! Capture session state machine.
//!
//! ```text
//! Idle ──► Aligning ──► Recording ──► Finalizing ──► Done
//!             │             │              │
//!             └─────────────┴──────────────┴──► Failed
//! ```

use core::fmt;

use replay_director_capture_core::{CaptureError, CaptureResult};
use tracing::debug;

/// Phase of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// Replay seeked to the race start, camera pre-positioned.
    Aligning,
    Recording,
    /// Video stopped, overlay being assembled and saved.
    Finalizing,
    Done,
    Failed,
}

impl CaptureState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Aligning => "Aligning",
            Self::Recording => "Recording",
            Self::Finalizing => "Finalizing",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    /// Terminal states accept no further transition.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// True if `self -> to` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, to: CaptureState) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Aligning)
                | (Self::Aligning, Self::Recording)
                | (Self::Recording, Self::Finalizing)
                | (Self::Finalizing, Self::Done)
                | (
                    Self::Aligning | Self::Recording | Self::Finalizing,
                    Self::Failed
                )
        )
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current [`CaptureState`] and every state visited.
#[derive(Debug, Clone)]
pub struct CaptureStateMachine {
    state: CaptureState,
    history: Vec<CaptureState>,
}

impl Default for CaptureStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureStateMachine {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            history: vec![CaptureState::Idle],
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn history(&self) -> &[CaptureState] {
        &self.history
    }

    pub fn transition(&mut self, to: CaptureState) -> CaptureResult<()> {
        if !self.state.can_transition_to(to) {
            return Err(CaptureError::invalid_transition(self.state, to));
        }
        debug!(from = %self.state, to = %to, "Capture state transition");
        self.state = to;
        self.history.push(to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const ALL: [CaptureState; 6] = [
        CaptureState::Idle,
        CaptureState::Aligning,
        CaptureState::Recording,
        CaptureState::Finalizing,
        CaptureState::Done,
        CaptureState::Failed,
    ];

    #[test]
    fn happy_path_reaches_done() -> TestResult {
        let mut machine = CaptureStateMachine::new();
        for to in [
            CaptureState::Aligning,
            CaptureState::Recording,
            CaptureState::Finalizing,
            CaptureState::Done,
        ] {
            machine.transition(to)?;
        }
        assert_eq!(machine.state(), CaptureState::Done);
        assert_eq!(machine.history().len(), 5);
        Ok(())
    }

    #[test]
    fn failed_only_from_active_states() -> TestResult {
        for from in ALL {
            let expected = matches!(
                from,
                CaptureState::Aligning | CaptureState::Recording | CaptureState::Finalizing
            );
            assert_eq!(from.can_transition_to(CaptureState::Failed), expected, "{from}");
        }
        Ok(())
    }

    #[test]
    fn terminal_states_reject_everything() -> TestResult {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(ALL.into_iter().all(|to| !from.can_transition_to(to)));
        }
        Ok(())
    }

    #[test]
    fn skipping_a_phase_is_an_invalid_transition() -> TestResult {
        let mut machine = CaptureStateMachine::new();
        let result = machine.transition(CaptureState::Recording);
        assert!(matches!(
            result,
            Err(CaptureError::InvalidTransition { ref from, ref to })
                if from == "Idle" && to == "Recording"
        ));
        assert_eq!(machine.state(), CaptureState::Idle);
        Ok(())
    }
}
