//! Error types for capture sessions.
//!
//! Errors carry a [`ErrorSeverity`] so callers can tell what aborts a session
//! from what is merely reported.

use core::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the capture crates.
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Errors raised by the capture pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The video backend produced no files after deactivation.
    #[error("Unable to find video files in '{}' - possible wrong working folder", working_folder.display())]
    NoVideoFiles { working_folder: PathBuf },

    /// No running process matched the requested name.
    #[error("Could not find running process '{name}'")]
    ProcessNotFound { name: String },

    /// A matching process was found but could not be terminated.
    #[error("Could not terminate process '{name}': {reason}")]
    ProcessTermination { name: String, reason: String },

    /// The overlay artifact could not be written or read.
    #[error("Failed to persist overlay data at '{}': {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Overlay or sample (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The external video recorder reported a failure.
    #[error("Video backend error: {0}")]
    VideoBackend(String),

    /// The simulator replay engine reported a failure.
    #[error("Replay engine error: {0}")]
    Replay(String),

    /// The telemetry source failed.
    #[error("Telemetry source error: {0}")]
    Telemetry(String),

    /// Focus restoration failed.
    #[error("Focus restoration failed: {0}")]
    Focus(String),

    /// Configuration values were rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The session state machine refused a transition.
    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// The telemetry source produced no samples at all.
    #[error("Telemetry source produced no samples")]
    EmptyStream,

    /// The session was cancelled before recording started.
    #[error("Capture session cancelled")]
    Cancelled,

    /// The session failed and terminating the simulator afterwards failed too.
    #[error("{cause}; simulator shutdown also failed: {shutdown}")]
    ShutdownFailed {
        #[source]
        cause: Box<CaptureError>,
        shutdown: Box<CaptureError>,
    },
}

impl CaptureError {
    #[must_use]
    pub fn no_video_files(working_folder: impl Into<PathBuf>) -> Self {
        Self::NoVideoFiles {
            working_folder: working_folder.into(),
        }
    }

    #[must_use]
    pub fn process_not_found(name: impl Into<String>) -> Self {
        Self::ProcessNotFound { name: name.into() }
    }

    #[must_use]
    pub fn process_termination(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProcessTermination {
            name: name.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn video_backend(reason: impl Into<String>) -> Self {
        Self::VideoBackend(reason.into())
    }

    #[must_use]
    pub fn replay(reason: impl Into<String>) -> Self {
        Self::Replay(reason.into())
    }

    #[must_use]
    pub fn telemetry(reason: impl Into<String>) -> Self {
        Self::Telemetry(reason.into())
    }

    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    #[must_use]
    pub fn invalid_transition(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[must_use]
    pub fn shutdown_failed(cause: CaptureError, shutdown: CaptureError) -> Self {
        Self::ShutdownFailed {
            cause: Box::new(cause),
            shutdown: Box::new(shutdown),
        }
    }

    /// The error that ended the session, looking through a failed shutdown.
    pub fn primary(&self) -> &CaptureError {
        match self {
            CaptureError::ShutdownFailed { cause, .. } => cause.primary(),
            other => other,
        }
    }

    /// How this error affects the running session.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CaptureError::Focus(_) => ErrorSeverity::BestEffort,
            CaptureError::InvalidConfiguration(_) | CaptureError::InvalidTransition { .. } => {
                ErrorSeverity::Recoverable
            }
            _ => ErrorSeverity::SessionFatal,
        }
    }

    /// True if the session must end in the failed state.
    pub fn is_session_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::SessionFatal
    }
}

/// Effect of an error on the capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Absorbed locally, the session continues.
    Recoverable,
    /// Reported, never affects the outcome.
    BestEffort,
    /// Aborts the session, reported once, never retried.
    SessionFatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Recoverable => write!(f, "recoverable"),
            ErrorSeverity::BestEffort => write!(f, "best-effort"),
            ErrorSeverity::SessionFatal => write!(f, "session-fatal"),
        }
    }
}
