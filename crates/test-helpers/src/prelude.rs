//! Convenience re-exports for tests.

pub use crate::builders::{SampleBuilder, TEST_FPS, race_stream, session_with_cars};
pub use crate::mock::{
    CallLog, MockCall, MockFocus, MockProcessControl, MockReplayEngine, MockVideoBackend,
};
