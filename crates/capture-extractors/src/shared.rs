//! Shared overlay handle and duplicate-sample guard.

use parking_lot::Mutex;
use std::sync::Arc;

use replay_director_capture_core::OverlayData;

/// Session times closer than this are treated as the same sample.
const SAME_SAMPLE_EPSILON: f64 = 1e-9;

/// Append handle to the session's [`OverlayData`].
///
/// Clones share the same overlay. The lock is only held for the duration of
/// one [`SharedOverlay::update`] call.
#[derive(Debug, Clone, Default)]
pub struct SharedOverlay {
    inner: Arc<Mutex<OverlayData>>,
}

impl SharedOverlay {
    pub fn new(overlay: OverlayData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(overlay)),
        }
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut OverlayData) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn read<R>(&self, f: impl FnOnce(&OverlayData) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Copy of the current overlay.
    pub fn snapshot(&self) -> OverlayData {
        self.inner.lock().clone()
    }
}

/// Remembers the last session time an extractor handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleGuard {
    last: Option<f64>,
}

impl SampleGuard {
    /// Returns true the first time a session time is seen; false for a
    /// repeat of the previous one.
    pub fn is_new(&mut self, session_time: f64) -> bool {
        let repeat = self
            .last
            .is_some_and(|last| (last - session_time).abs() < SAME_SAMPLE_EPSILON);
        self.last = Some(session_time);
        !repeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn guard_rejects_repeated_time() -> TestResult {
        let mut guard = SampleGuard::default();
        assert!(guard.is_new(1.0));
        assert!(!guard.is_new(1.0));
        assert!(guard.is_new(1.5));
        Ok(())
    }

    #[test]
    fn clones_share_overlay() -> TestResult {
        let overlay = SharedOverlay::default();
        let other = overlay.clone();
        other.update(|o| o.captured_version = "1.2.3".to_string());
        assert_eq!(overlay.read(|o| o.captured_version.clone()), "1.2.3");
        Ok(())
    }
}
