//! `replayctl config`: create and show capture configuration files.

use anyhow::Result;
use replay_director_capture_core::CaptureConfig;

use super::{ConfigCommands, ensure_exists};
use crate::error::CliError;
use crate::output;

pub async fn execute(cmd: &ConfigCommands, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                return Err(CliError::FileExists(path.clone()).into());
            }
            CaptureConfig::default().save_to_path(path)?;
            output::print_success(&format!("Wrote {}", path.display()), json);
        }
        ConfigCommands::Show { path } => {
            let config = match path {
                Some(path) => {
                    ensure_exists(path)?;
                    CaptureConfig::load_from_path(path)?
                }
                None => CaptureConfig::default(),
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
