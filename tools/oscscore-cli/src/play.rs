//! Play command - drive a player and print every delivered packet

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use oscscore_core::{Loopback, Packet, Player, PlayerState, config};

/// Arguments for the play command
#[derive(Args)]
pub struct PlayArgs {
    /// Score file (.oscs)
    pub score: PathBuf,

    /// Pace ticks in real time at this many frames per second
    #[arg(long)]
    pub fps: Option<f64>,

    /// Stop after this many ticks even if events remain
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured lookahead depth
    #[arg(long)]
    pub lookahead: Option<usize>,
}

/// Loopback that writes each packet as a line of text
struct PrintSink<W: Write> {
    out: W,
    /// Frame being delivered, set before each tick
    frame: i64,
}

impl<W: Write> Loopback for PrintSink<W> {
    fn deliver(&mut self, packet: Packet) {
        let line = match &packet {
            Packet::Single(msg) => format!("[{}] {} {:?}", self.frame, msg, msg.args()),
            Packet::Bundle(_) => format!("[{}] {}", self.frame, packet),
        };
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::warn!("failed to print packet: {}", e);
        }
    }
}

/// Execute the play command
pub fn execute(args: PlayArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => config::load(),
    };
    if let Some(lookahead) = args.lookahead {
        config.player.lookahead = lookahead;
    }

    let frame_time = match args.fps {
        Some(fps) if fps > 0.0 && fps.is_finite() => Some(Duration::from_secs_f64(1.0 / fps)),
        Some(fps) => anyhow::bail!("Invalid frame rate: {}", fps),
        None => None,
    };

    let sink = PrintSink {
        out: std::io::stdout().lock(),
        frame: -1,
    };
    let mut player = Player::open(&args.score, sink, config.player)
        .with_context(|| format!("Failed to open score: {}", args.score.display()))?;

    if let Some(header) = player.header() {
        println!("Playing {} (generator: {})", args.score.display(), header.generator);
    }

    let started = Instant::now();
    let mut ticks = 0u64;
    let mut diagnostics = 0usize;

    while player.current_state() != PlayerState::Exhausted {
        if args.max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }

        player.sink_mut().frame = player.clock() + 1;
        let report = player.tick();
        diagnostics += report.diagnostics.len();
        ticks += 1;

        if let Some(frame_time) = frame_time {
            let due = started + frame_time.mul_f64(ticks as f64);
            if let Some(wait) = due.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }
        }
    }

    println!();
    println!("=== Playback Complete ===");
    println!("{}", player.status());
    println!("Delivered: {}", player.delivered());
    if diagnostics > 0 {
        println!("Diagnostics: {}", diagnostics);
    }

    Ok(())
}
