//! Inspect command - summarize a score and check every record

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use oscscore_core::{ScoreError, ScoreReader, StreamEnd};

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Score file (.oscs)
    pub score: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// What a full pass over a score found
#[derive(Debug, Default, Serialize)]
pub struct ScoreSummary {
    pub generator: String,
    pub version: u8,
    /// Records read, including corrupt ones
    pub records: u64,
    pub packets: usize,
    pub bundles: usize,
    pub messages: usize,
    pub first_frame: Option<u32>,
    pub last_frame: Option<u32>,
    /// Records whose frame is lower than the one before
    pub out_of_order: usize,
    /// "closed", "incomplete" or "unreadable"
    pub end: &'static str,
    /// Description of each corrupt record
    pub corrupt: Vec<String>,
}

/// Read a whole score, collecting statistics
///
/// Only an unreadable header is an error; damage past the header is
/// reported in the summary.
pub fn summarize<R: Read>(source: R) -> Result<ScoreSummary> {
    let mut reader = ScoreReader::new(source);
    let header = reader.read_header().context("Failed to read score header")?;

    let mut summary = ScoreSummary {
        generator: header.generator,
        version: header.version,
        ..Default::default()
    };

    loop {
        match reader.read_event() {
            Ok(Some(event)) => {
                if summary.last_frame.is_some_and(|last| event.frame < last) {
                    summary.out_of_order += 1;
                }
                summary.first_frame.get_or_insert(event.frame);
                summary.last_frame = Some(event.frame);
                summary.packets += 1;
                summary.messages += event.packet.len();
                if event.packet.is_bundle() {
                    summary.bundles += 1;
                }
            }
            Ok(None) => break,
            Err(ScoreError::Corrupt(e)) => {
                summary.corrupt.push(format!("record {}: {}", reader.records_read(), e));
            }
            // The reader is finished after any other error
            Err(e) => summary.corrupt.push(format!("read failed: {}", e)),
        }
    }

    summary.records = reader.records_read();
    summary.end = match reader.end() {
        Some(StreamEnd::Closed) => "closed",
        Some(StreamEnd::Incomplete) => "incomplete",
        Some(StreamEnd::Unreadable) | None => "unreadable",
    };
    Ok(summary)
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let file = File::open(&args.score)
        .with_context(|| format!("Failed to open score: {}", args.score.display()))?;
    let summary = summarize(BufReader::new(file))
        .with_context(|| format!("Failed to inspect score: {}", args.score.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&args.score, &summary);
    }

    if !summary.corrupt.is_empty() {
        anyhow::bail!("{} corrupt record(s) found", summary.corrupt.len());
    }
    Ok(())
}

fn print_summary(path: &std::path::Path, summary: &ScoreSummary) {
    println!("=== {} ===", path.display());
    println!("Generator: {}", summary.generator);
    println!("Version: {}", summary.version);
    println!(
        "Records: {} ({} packets, {} bundles, {} messages)",
        summary.records, summary.packets, summary.bundles, summary.messages
    );
    match (summary.first_frame, summary.last_frame) {
        (Some(first), Some(last)) => println!("Frames: {} - {}", first, last),
        _ => println!("Frames: none"),
    }
    if summary.out_of_order > 0 {
        println!("Out-of-order records: {}", summary.out_of_order);
    }
    println!("End: {}", summary.end);

    for problem in &summary.corrupt {
        println!("  CORRUPT {}", problem);
    }
}
