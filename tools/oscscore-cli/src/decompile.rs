//! Decompile a score to script format

use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use oscscore_core::script::decompile;
use oscscore_core::{ScoreError, ScoreReader, StreamEnd};

/// Arguments for the decompile command
#[derive(Args)]
pub struct DecompileArgs {
    /// Input score (.oscs)
    pub input: PathBuf,

    /// Output script (.toml)
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Decompile a score to a TOML script
///
/// Corrupt records are skipped with a warning so a damaged recording can
/// still be salvaged by hand.
pub fn execute(args: DecompileArgs) -> Result<()> {
    println!(
        "Decompiling: {} -> {}",
        args.input.display(),
        args.output.display()
    );

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open score: {}", args.input.display()))?;
    let mut reader = ScoreReader::new(BufReader::new(file));
    let header = reader
        .read_header()
        .with_context(|| format!("Failed to read score header: {}", args.input.display()))?;

    let mut events = Vec::new();
    let mut skipped = 0usize;
    loop {
        match reader.read_event() {
            Ok(Some(event)) => events.push(event),
            Ok(None) => break,
            Err(ScoreError::Corrupt(e)) => {
                tracing::warn!("skipping corrupt record: {}", e);
                skipped += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| "Failed to read score");
            }
        }
    }
    if reader.end() == Some(StreamEnd::Incomplete) {
        tracing::warn!("score has no closing marker; decompiling the complete records");
    }

    let script = decompile(&header, &events).with_context(|| "Failed to decompile score")?;
    let toml = script.to_toml().with_context(|| "Failed to serialize script")?;
    std::fs::write(&args.output, toml)
        .with_context(|| format!("Failed to write script: {}", args.output.display()))?;

    println!();
    println!("=== Decompilation Complete ===");
    println!("Packets: {}", events.len());
    if let Some(last) = events.last() {
        println!("Last frame: {}", last.frame);
    }
    if skipped > 0 {
        println!("Skipped corrupt records: {}", skipped);
    }

    Ok(())
}
