//! replayctl - race replay capture CLI
//!
//! Drives capture sessions against recorded telemetry, records highlight
//! reels from an earlier race analysis and inspects the saved overlays.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod dry_run;
mod error;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::*;

#[derive(Parser)]
#[command(name = "replayctl")]
#[command(about = "Race replay capture CLI - record replays and their overlay data")]
#[command(version)]
#[command(long_about = "
replayctl runs race replay capture sessions: it aligns the replay to the race
start, records the race (or a reel of its highlights) while directing the
camera, and saves the overlay data next to the produced video.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a race from recorded telemetry
    Capture(CaptureArgs),

    /// Record a highlight reel from an analysed race
    Highlights(HighlightArgs),

    /// Summarise a saved overlay
    Inspect {
        /// Overlay file (.replayscript)
        file: PathBuf,
    },

    /// Capture configuration files
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("replayctl={log_level},replay_director={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            std::process::exit(error::exit_code(&e));
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Capture(args) => commands::capture::execute(args, cli.json).await,
        Commands::Highlights(args) => commands::highlights::execute(args, cli.json).await,
        Commands::Inspect { file } => commands::inspect::execute(file, cli.json).await,
        Commands::Config(cmd) => commands::config::execute(cmd, cli.json).await,
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}
