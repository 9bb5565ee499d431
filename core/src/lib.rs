//! OSC Score - frame-indexed recording and playback of OSC traffic
//!
//! This crate records timestamped OSC messages into a score document and
//! plays them back in lockstep with a host's frame loop.
//!
//! # Architecture
//!
//! - [`Recorder`] - Coalesces messages per frame and appends records
//! - [`Player`] - Streams records and delivers them on matching ticks
//! - [`Loopback`] - Capability the host implements to receive packets
//! - [`codec`] - Binary score format ([`ScoreReader`] / [`ScoreWriter`])
//! - [`script`] - Human-readable TOML rendition of a score

pub mod codec;
pub mod config;
pub mod error;
#[cfg(test)]
mod integration;
pub mod loopback;
pub mod player;
pub mod recorder;
pub mod script;
#[cfg(test)]
pub mod test_utils;
pub mod types;

// Re-export the message model
pub use types::{Argument, Bundle, Event, Message, Packet};

// Re-export codec types
pub use codec::{ScoreHeader, ScoreReader, ScoreWriter, StreamEnd};
pub use error::{CorruptData, ScoreError};

// Re-export runtime types
pub use loopback::Loopback;
pub use player::{Diagnostic, Player, PlayerConfig, PlayerState, PlayerStatus, TickReport};
pub use recorder::{Recorder, RecorderConfig, RecorderState};

pub use config::Config;
pub use script::{ScoreScript, ScriptError};
