//! Score player
//!
//! Streams a score document and hands each packet to a [`Loopback`] sink on
//! the tick whose clock matches the packet's frame.
//!
//! The player never drives itself: the host calls [`Player::tick`] once per
//! frame. Each tick advances the local clock, tops up a bounded queue of
//! decoded events, and delivers every queued event due at the new clock.

use crate::codec::{ScoreHeader, ScoreReader, StreamEnd};
use crate::error::{CorruptData, ScoreError};
use crate::loopback::Loopback;
use crate::types::Event;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Number of decoded events kept ahead of the clock (default: 60, min: 1)
    ///
    /// The worst case is one event per frame, so one second's worth of frames
    /// keeps the queue from running dry between ticks.
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
}

fn default_lookahead() -> usize {
    60
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
        }
    }
}

/// Player lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Created but never rewound
    Uninitialized,
    /// Positioned at the first record, clock before frame 0
    Ready,
    /// At least one tick since the last rewind
    Ticking,
    /// Every event has been delivered and the stream has ended
    Exhausted,
    /// The last rewind failed; ticks do nothing
    Failed,
}

/// Problems noticed while refilling the queue
///
/// None of these stop playback.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A malformed record was skipped
    CorruptRecord(CorruptData),
    /// An event was already behind the clock when it reached the queue head
    LateEvent { frame: u32, clock: i64 },
    /// The score ended without its closing marker
    Truncated,
    /// The underlying stream failed; no further records will be read
    ReadFailed(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptRecord(e) => write!(f, "Invalid score content: {}", e),
            Self::LateEvent { frame, clock } => {
                write!(f, "Event at frame {} dropped at frame {}", frame, clock)
            }
            Self::Truncated => write!(f, "Score ends without a closing marker"),
            Self::ReadFailed(e) => write!(f, "Score could not be read: {}", e),
        }
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Clock value after the tick
    pub clock: i64,
    /// Packets handed to the sink during the tick
    pub delivered: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Score player state
pub struct Player<R: Read + Seek, S: Loopback> {
    reader: ScoreReader<R>,
    sink: S,
    config: PlayerConfig,
    /// Decoded events not yet delivered, in document order
    queue: VecDeque<Event>,
    clock: i64,
    state: PlayerState,
    header: Option<ScoreHeader>,
    delivered: u64,
}

impl<S: Loopback> Player<BufReader<File>, S> {
    /// Open the score at `path` and rewind to its first record
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::Io`] if the file cannot be opened and
    /// [`ScoreError::InvalidHeader`] if it is not a score document.
    pub fn open(path: impl AsRef<Path>, sink: S, config: PlayerConfig) -> Result<Self, ScoreError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        tracing::info!(path = %path.display(), "opening score");

        let mut player = Self::new(BufReader::new(file), sink, config);
        player.rewind()?;
        Ok(player)
    }
}

impl<R: Read + Seek, S: Loopback> Player<R, S> {
    /// Create a player over `source`
    ///
    /// The player starts [`PlayerState::Uninitialized`]; call
    /// [`Player::rewind`] before ticking.
    pub fn new(source: R, sink: S, config: PlayerConfig) -> Self {
        Self {
            reader: ScoreReader::new(source),
            sink,
            config,
            queue: VecDeque::new(),
            clock: -1,
            state: PlayerState::Uninitialized,
            header: None,
            delivered: 0,
        }
    }

    /// Rewind the score and restart the player
    ///
    /// Clears the queue and resets the clock so the next tick is frame 0.
    /// On failure the player becomes [`PlayerState::Failed`] and stays inert
    /// until a later rewind succeeds.
    pub fn rewind(&mut self) -> Result<(), ScoreError> {
        self.queue.clear();
        self.clock = -1;

        match self.reader.rewind() {
            Ok(header) => {
                tracing::debug!(generator = %header.generator, "score rewound");
                self.header = Some(header);
                self.state = PlayerState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Invalid score content: {}", e);
                self.header = None;
                self.state = PlayerState::Failed;
                Err(e)
            }
        }
    }

    /// Advance the clock by one frame and deliver everything due
    pub fn tick(&mut self) -> TickReport {
        if !matches!(self.state, PlayerState::Ready | PlayerState::Ticking) {
            return TickReport {
                clock: self.clock,
                ..Default::default()
            };
        }

        self.clock += 1;
        self.state = PlayerState::Ticking;
        let mut report = TickReport {
            clock: self.clock,
            ..Default::default()
        };

        self.refill(&mut report.diagnostics);

        loop {
            // Same-frame events must not be split across ticks, so top the
            // queue up again whenever delivery drains it.
            if self.queue.is_empty() {
                self.refill(&mut report.diagnostics);
            }

            let Some(frame) = self.queue.front().map(|event| i64::from(event.frame)) else {
                break;
            };
            if frame > self.clock {
                break;
            }
            let Some(event) = self.queue.pop_front() else {
                break;
            };

            if frame < self.clock {
                tracing::warn!(frame, clock = self.clock, "dropping late score event");
                report.diagnostics.push(Diagnostic::LateEvent {
                    frame: event.frame,
                    clock: self.clock,
                });
                continue;
            }

            tracing::debug!(clock = self.clock, "delivering {}", event);
            self.sink.deliver(event.packet);
            report.delivered += 1;
        }

        self.delivered += report.delivered as u64;

        if self.queue.is_empty() && self.reader.is_finished() {
            tracing::info!(
                frame = self.clock,
                delivered = self.delivered,
                "score playback finished"
            );
            self.state = PlayerState::Exhausted;
        }

        report
    }

    /// Decode records until the queue holds `lookahead` events or the
    /// stream ends
    fn refill(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        if self.reader.is_finished() {
            return;
        }

        let wanted = self.config.lookahead.max(1).saturating_sub(self.queue.len());
        for _ in 0..wanted {
            match self.reader.read_event() {
                Ok(Some(event)) => self.queue.push_back(event),
                Ok(None) => {
                    if self.reader.end() == Some(StreamEnd::Incomplete) {
                        diagnostics.push(Diagnostic::Truncated);
                    }
                    break;
                }
                Err(ScoreError::Corrupt(e)) => {
                    tracing::warn!("Invalid score content: {}", e);
                    diagnostics.push(Diagnostic::CorruptRecord(e));
                }
                Err(e) => {
                    tracing::warn!("Score could not be read: {}", e);
                    diagnostics.push(Diagnostic::ReadFailed(e.to_string()));
                    break;
                }
            }
        }
    }

    pub fn current_state(&self) -> PlayerState {
        self.state
    }

    /// Local clock; -1 before the first tick
    pub fn clock(&self) -> i64 {
        self.clock
    }

    /// Number of decoded events waiting for their frame
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Header of the score, once rewound
    pub fn header(&self) -> Option<&ScoreHeader> {
        self.header.as_ref()
    }

    /// Packets delivered since the player was created
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Snapshot for diagnostics
    pub fn status(&self) -> PlayerStatus<'_> {
        PlayerStatus {
            state: self.state,
            clock: self.clock,
            queued: self.queue.len(),
            next: self.queue.front(),
        }
    }

    /// Change the lookahead depth (e.g. when the host frame rate changes)
    pub fn set_lookahead(&mut self, lookahead: usize) {
        self.config.lookahead = lookahead.max(1);
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Point-in-time view of a player, rendered as one line of text
#[derive(Debug, Clone, Copy)]
pub struct PlayerStatus<'a> {
    pub state: PlayerState,
    pub clock: i64,
    pub queued: usize,
    pub next: Option<&'a Event>,
}

impl fmt::Display for PlayerStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Player: {:?} - Current frame: {} - Queued: {} - ",
            self.state, self.clock, self.queued
        )?;
        match self.next {
            Some(event) => write!(f, "Scheduled event: {}", event),
            None => write!(f, "Scheduled event: NO EVENT"),
        }
    }
}
