//! `replayctl capture`: record a full race or a highlight reel from
//! recorded telemetry.

use anyhow::{Context, Result};
use replay_director_capture_core::{CaptureConfig, RaceEvent, TelemetrySource};
use replay_director_capture_orchestrator::prelude::*;
use replay_director_capture_recorder::{FolderVideoBackend, RecordedTelemetrySource, load_overlay};
use replay_director_process_control::{LoggingFocusRestorer, SysinfoProcessControl};
use tracing::{info, warn};

use super::{CaptureArgs, ensure_exists};
use crate::dry_run::{DryRunRecorderControl, DryRunReplayEngine};
use crate::error::CliError;
use crate::output;

pub async fn execute(args: &CaptureArgs, json: bool) -> Result<()> {
    let mut config = args.session.load_config()?;
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }

    let known_events = match &args.events {
        Some(path) => {
            ensure_exists(path)?;
            load_overlay(path)
                .with_context(|| format!("loading race events from {}", path.display()))?
                .race_events
        }
        None => Vec::new(),
    };

    ensure_exists(&args.telemetry)?;
    let mut source = RecordedTelemetrySource::open(&args.telemetry)?;
    if let Some(speed) = args.realtime {
        source = source.with_realtime_playback(speed);
    }

    let outcome = run_capture(config, Box::new(source), known_events).await?;
    output::print_outcome(&outcome, json);
    Ok(())
}

/// Run a session on a blocking thread; Ctrl-C cancels it.
pub(crate) async fn run_capture(
    config: CaptureConfig,
    source: Box<dyn TelemetrySource>,
    known_events: Vec<RaceEvent>,
) -> Result<CaptureOutcome> {
    let folder = config.working_folder.clone();
    let mut strategy = strategy_for(&config, known_events.clone());
    let mut controller = CaptureController::new(
        config,
        FolderVideoBackend::new(DryRunRecorderControl::new(folder)),
        ReplayChannel::new(DryRunReplayEngine::default()),
        SysinfoProcessControl::new(),
        LoggingFocusRestorer,
    )?
    .with_known_events(known_events);
    let cancel = controller.cancel_token();

    let mut task = tokio::task::spawn_blocking(move || controller.run(source, strategy.as_mut()));

    let joined = tokio::select! {
        joined = &mut task => joined,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupt received, finishing capture"),
                Err(e) => warn!(error = %e, "Cannot listen for interrupts"),
            }
            cancel.cancel();
            task.await
        }
    };

    let outcome = joined.map_err(|e| CliError::TaskFailed(e.to_string()))??;
    Ok(outcome)
}
