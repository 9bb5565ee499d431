//! Compile a score script to binary format

use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use oscscore_core::ScoreScript;
use oscscore_core::script::{compile, write_events};

/// Arguments for the compile command
#[derive(Args)]
pub struct CompileArgs {
    /// Input script (.toml)
    pub input: PathBuf,

    /// Output score (.oscs)
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Compile a script to a score file
pub fn execute(args: CompileArgs) -> Result<()> {
    println!(
        "Compiling: {} -> {}",
        args.input.display(),
        args.output.display()
    );

    let script = ScoreScript::from_file(&args.input)
        .with_context(|| format!("Failed to parse script: {}", args.input.display()))?;

    // Check the whole script before touching the output file
    let events = compile(&script).with_context(|| "Failed to compile script")?;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create output file: {}", args.output.display()))?;
    write_events(&script.generator, &events, BufWriter::new(file))
        .with_context(|| "Failed to write score")?;

    println!();
    println!("=== Compilation Complete ===");
    println!("Generator: {}", script.generator);
    println!("Packets: {}", events.len());
    if let Some(last) = events.last() {
        println!("Last frame: {}", last.frame);
    }

    Ok(())
}
