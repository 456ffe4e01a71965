//! Command implementations for replayctl

pub mod capture;
pub mod config;
pub mod highlights;
pub mod inspect;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use replay_director_capture_core::{CaptureConfig, StrategyKind};

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Record the whole race
    Full,
    /// Record only selected race events
    Highlights,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Full => StrategyKind::Full,
            StrategyArg::Highlights => StrategyKind::Highlights,
        }
    }
}

/// Options shared by every command that starts a capture session.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Capture configuration file (JSON); defaults apply when omitted
    #[arg(short, long, env = "REPLAYCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Folder the recorder writes into and the overlay is saved to
    #[arg(short, long)]
    pub working_folder: Option<PathBuf>,

    /// Run the replay faster by this factor for a quick test capture
    #[arg(long, value_name = "FACTOR")]
    pub short_test: Option<i32>,

    /// Terminate the named simulator process after recording
    #[arg(long, value_name = "PROCESS")]
    pub close_sim: Option<String>,

    /// Video prepended to the produced file list
    #[arg(long)]
    pub intro_video: Option<String>,

    /// Pause after each replay acknowledgement during alignment, in seconds
    #[arg(long)]
    pub alignment_hold: Option<f64>,
}

impl SessionArgs {
    /// Load the configuration file, if any, and apply command-line overrides.
    pub fn load_config(&self) -> Result<CaptureConfig> {
        let mut config = match &self.config {
            Some(path) => {
                ensure_exists(path)?;
                CaptureConfig::load_from_path(path)
                    .with_context(|| format!("loading {}", path.display()))?
            }
            None => CaptureConfig::default(),
        };

        if let Some(folder) = &self.working_folder {
            config.working_folder.clone_from(folder);
        }
        if let Some(factor) = self.short_test {
            config.short_test_only = true;
            config.timing_factor_for_short_test = factor;
        }
        if let Some(process) = &self.close_sim {
            config.close_sim_after_recording = true;
            config.sim_process_name.clone_from(process);
        }
        if let Some(intro) = &self.intro_video {
            config.intro_video = Some(intro.clone());
        }
        if let Some(hold) = self.alignment_hold {
            config.alignment_hold_secs = hold;
        }

        config
            .validate()
            .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Recorded telemetry (JSON lines, one sample per line)
    #[arg(short, long)]
    pub telemetry: PathBuf,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Capture strategy; overrides the configuration file
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Overlay of an earlier analysis supplying race events
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Deliver samples at the pace they were recorded, scaled by this speed
    #[arg(long, value_name = "SPEED")]
    pub realtime: Option<f64>,
}

#[derive(Debug, Args)]
pub struct HighlightArgs {
    /// Overlay of an earlier analysis supplying race events
    #[arg(short, long)]
    pub overlay: PathBuf,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Recorded telemetry providing the session the replay is aligned on
    #[arg(short, long)]
    pub telemetry: Option<PathBuf>,

    /// Target reel length in seconds
    #[arg(long)]
    pub target: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Destination path
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Configuration file; defaults are shown when omitted
        path: Option<PathBuf>,
    },
}

pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()).into());
    }
    Ok(())
}
