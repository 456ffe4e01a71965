//! Error types for replayctl

use std::path::PathBuf;

use replay_director_capture_core::CaptureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File already exists: {} (use --force to overwrite)", .0.display())]
    FileExists(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Capture task failed: {0}")]
    TaskFailed(String),
}

/// Process exit code for a failed command.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(capture) = cause.downcast_ref::<CaptureError>() {
            return match capture.primary() {
                CaptureError::NoVideoFiles { .. } => 2,
                CaptureError::ProcessNotFound { .. } | CaptureError::ProcessTermination { .. } => 3,
                CaptureError::Persistence { .. } | CaptureError::Serialization(_) => 4,
                CaptureError::InvalidConfiguration(_) => 5,
                _ => 1,
            };
        }
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return match cli {
                CliError::InvalidConfiguration(_) => 5,
                CliError::FileNotFound(_) => 4,
                CliError::FileExists(_) | CliError::TaskFailed(_) => 1,
            };
        }
    }
    1
}
