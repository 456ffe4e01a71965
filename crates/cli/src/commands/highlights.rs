//! `replayctl highlights`: record a reel of the most interesting events of
//! an analysed race.

use std::sync::Arc;

use anyhow::{Context, Result};
use replay_director_capture_core::{
    IteratorSource, Sample, StrategyKind, Telemetry, TelemetrySource,
};
use replay_director_capture_recorder::{RecordedTelemetrySource, load_overlay};

use super::{HighlightArgs, ensure_exists};
use crate::error::CliError;
use crate::output;

pub async fn execute(args: &HighlightArgs, json: bool) -> Result<()> {
    let mut config = args.session.load_config()?;
    config.strategy = StrategyKind::Highlights;
    if let Some(target) = args.target {
        if !target.is_finite() || target <= 0.0 {
            return Err(CliError::InvalidConfiguration(
                "highlight target must be greater than 0".to_string(),
            )
            .into());
        }
        config.highlight_target_secs = target;
    }

    ensure_exists(&args.overlay)?;
    let overlay = load_overlay(&args.overlay)
        .with_context(|| format!("loading {}", args.overlay.display()))?;

    let source: Box<dyn TelemetrySource> = match &args.telemetry {
        Some(path) => {
            ensure_exists(path)?;
            Box::new(RecordedTelemetrySource::open(path)?)
        }
        None => {
            let session = overlay.session_data.clone().ok_or_else(|| {
                CliError::InvalidConfiguration(format!(
                    "{} has no session data; pass --telemetry",
                    args.overlay.display()
                ))
            })?;
            let first = Sample::new(Arc::new(session), Telemetry::default());
            Box::new(IteratorSource::new([first]))
        }
    };

    let outcome = super::capture::run_capture(config, source, overlay.race_events).await?;
    output::print_outcome(&outcome, json);
    Ok(())
}
