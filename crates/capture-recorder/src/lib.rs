//! Persistence and recorder integration for capture sessions.
//!
//! - [`artifact`] - Saving and loading the `.replayscript` overlay artifact
//! - [`video_backend`] - A [`VideoBackend`](replay_director_capture_core::VideoBackend)
//!   for recorders that write into a folder
//! - [`telemetry_source`] - JSON-lines telemetry recording and playback

#![deny(static_mut_refs)]

pub mod artifact;
pub mod telemetry_source;
pub mod video_backend;

pub use artifact::{
    REPLAY_SCRIPT_EXTENSION, load_overlay, overlay_file_path, save_analysis, save_capture,
    save_overlay,
};
pub use telemetry_source::{RecordedTelemetrySource, write_samples};
pub use video_backend::{FolderVideoBackend, RecorderControl, VIDEO_EXTENSIONS, discover_videos};
