//! oscscore CLI - Inspect, convert and play OSC score files
//!
//! # Commands
//!
//! - `oscscore inspect` - Summarize a score and check every record
//! - `oscscore decompile` - Convert a score to an editable TOML script
//! - `oscscore compile` - Convert a TOML script back to a score
//! - `oscscore play` - Play a score, printing each packet as it is delivered
//!
//! # Usage
//!
//! ```bash
//! # Check a recording left behind by a crashed session
//! oscscore inspect take1.oscs
//!
//! # Edit a recording by hand
//! oscscore decompile take1.oscs -o take1.toml
//! oscscore compile take1.toml -o take1-edited.oscs
//!
//! # Play back at 60 frames per second
//! oscscore play take1-edited.oscs --fps 60
//! ```

mod compile;
mod decompile;
mod inspect;
mod play;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// oscscore - Frame-indexed OSC score tool
#[derive(Parser)]
#[command(name = "oscscore")]
#[command(about = "Inspect, convert and play OSC score files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a score and report corrupt records
    Inspect(inspect::InspectArgs),

    /// Convert a score to a TOML script
    Decompile(decompile::DecompileArgs),

    /// Convert a TOML script to a score
    Compile(compile::CompileArgs),

    /// Play a score, printing delivered packets
    Play(play::PlayArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Decompile(args) => decompile::execute(args),
        Commands::Compile(args) => compile::execute(args),
        Commands::Play(args) => play::execute(args),
    }
}
