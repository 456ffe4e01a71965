//! Event extractors for race replay capture.
//!
//! Each extractor is a single-writer [`SampleProcessor`] bound to one region
//! of the overlay:
//!
//! - [`SessionDataCapture`] - session metadata, on every change
//! - [`RemovalEdits`] - caution ranges to cut, plus the running exclusion flag
//! - [`RecordPitStop`] - pit road entries and exits, posted as commentary
//! - [`RecordFastestLaps`] - per-class lap record improvements
//! - [`CaptureLeaderBoard`] - running order snapshots
//! - [`CaptureCamDriver`] / [`LogCamDriver`] - camera assignment history
//!
//! Every stateful extractor ignores a sample that repeats the previous
//! sample's session time, and starts tracking a car the first time it sees
//! it.

#![deny(static_mut_refs)]

pub mod cam_driver;
pub mod commentary;
pub mod dispatch;
pub mod fastest_laps;
pub mod leaderboard;
pub mod pit_stop;
pub mod removal_edits;
pub mod session_data;
pub mod shared;

pub use cam_driver::{CamDriverQueue, CaptureCamDriver, LogCamDriver, observed_cam_driver};
pub use commentary::{CommentaryMessages, MESSAGE_DISPLAY_SECS};
pub use dispatch::ExtractorSet;
pub use fastest_laps::RecordFastestLaps;
pub use leaderboard::{CaptureLeaderBoard, race_position};
pub use pit_stop::RecordPitStop;
pub use removal_edits::RemovalEdits;
pub use replay_director_capture_cadence::SampleProcessor;
pub use session_data::SessionDataCapture;
pub use shared::{SampleGuard, SharedOverlay};
