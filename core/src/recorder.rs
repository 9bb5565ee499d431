//! Score recorder
//!
//! Captures live OSC messages into a score document. Messages arriving at
//! the same frame are coalesced into one record (a bundle when there is more
//! than one), which is written as soon as a later frame shows up.

use crate::codec::{ScoreHeader, ScoreWriter, validate_message};
use crate::error::ScoreError;
use crate::types::{Message, Packet};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Configuration for the recorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Name stamped into the score header (default: "oscscore")
    #[serde(default = "default_generator")]
    pub generator: String,
}

fn default_generator() -> String {
    "oscscore".to_string()
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            generator: default_generator(),
        }
    }
}

/// Recorder lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Nothing written yet
    Idle,
    /// Header written, records being appended
    Recording,
    /// Close marker written and stream released
    Closed,
    /// A write to the stream failed; nothing more is written
    Failed,
}

/// Messages waiting for their frame to end
#[derive(Debug)]
struct PendingGroup {
    frame: u32,
    messages: Vec<Message>,
}

/// Score recorder state
pub struct Recorder<W: Write> {
    config: RecorderConfig,
    writer: Option<ScoreWriter<W>>,
    state: RecorderState,
    pending: Option<PendingGroup>,
    records_written: u64,
}

impl Recorder<BufWriter<File>> {
    /// Create the score file at `path` and record into it
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::Io`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, config: RecorderConfig) -> Result<Self, ScoreError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        tracing::info!(path = %path.display(), "recording score");
        Ok(Self::new(BufWriter::new(file), config))
    }
}

impl<W: Write> Recorder<W> {
    /// Create a recorder writing to `writer`
    ///
    /// Nothing is written until the first call to [`Recorder::start`] or
    /// [`Recorder::record_event`].
    pub fn new(writer: W, config: RecorderConfig) -> Self {
        Self {
            config,
            writer: Some(ScoreWriter::new(writer)),
            state: RecorderState::Idle,
            pending: None,
            records_written: 0,
        }
    }

    /// Write the score header
    ///
    /// Only the first call writes anything.
    pub fn start(&mut self) -> Result<(), ScoreError> {
        match self.state {
            RecorderState::Recording => Ok(()),
            RecorderState::Closed => Err(ScoreError::Closed),
            RecorderState::Failed => Err(ScoreError::Failed),
            RecorderState::Idle => {
                let header = ScoreHeader::new(self.config.generator.clone());
                let result = self
                    .writer_mut()
                    .and_then(|writer| writer.write_header(&header));
                self.check_io(result)?;
                self.state = RecorderState::Recording;
                Ok(())
            }
        }
    }

    /// Record a message received at `frame`
    ///
    /// Frames are expected to be non-decreasing. A message whose frame is
    /// behind the pending group joins that group; the recorder never
    /// reorders.
    ///
    /// # Errors
    ///
    /// - [`ScoreError::Corrupt`] if the message cannot be stored (empty
    ///   address or an unsupported argument kind); it is not recorded
    /// - [`ScoreError::Io`] if flushing the previous frame's group fails; the
    ///   recorder becomes [`RecorderState::Failed`] and the new message is
    ///   not recorded
    /// - [`ScoreError::Closed`] after [`Recorder::shutdown`]
    /// - [`ScoreError::Failed`] after any earlier write failure
    pub fn record_event(&mut self, frame: u32, message: Message) -> Result<(), ScoreError> {
        self.start()?;
        validate_message(&message)?;

        match self.pending.as_ref().map(|group| group.frame) {
            Some(pending) if frame > pending => {
                self.flush_pending()?;
                self.pending = Some(PendingGroup {
                    frame,
                    messages: vec![message],
                });
            }
            Some(pending) => {
                if frame < pending {
                    tracing::debug!(frame, pending, "message frame is behind the pending group");
                }
                if let Some(group) = self.pending.as_mut() {
                    group.messages.push(message);
                }
            }
            None => {
                self.pending = Some(PendingGroup {
                    frame,
                    messages: vec![message],
                });
            }
        }
        Ok(())
    }

    /// Write the pending group as one record
    fn flush_pending(&mut self) -> Result<(), ScoreError> {
        let Some(group) = self.pending.take() else {
            return Ok(());
        };
        let frame = group.frame;
        let Some(packet) = Packet::from_messages(group.messages) else {
            return Ok(());
        };

        let writer = self.writer.as_mut().ok_or(ScoreError::Closed)?;
        if let Err(e) = writer.write_event(frame, &packet) {
            self.pending = Some(PendingGroup {
                frame,
                messages: packet.into_messages(),
            });
            return self.check_io(Err(e));
        }
        self.records_written += 1;
        Ok(())
    }

    /// Flush the pending group, write the close marker and release the stream
    ///
    /// Calling this again after the recorder is closed does nothing. A write
    /// failure leaves the recorder [`RecorderState::Failed`]; any other
    /// failure still releases the stream and closes the recorder.
    pub fn shutdown(&mut self) -> Result<(), ScoreError> {
        self.close().map(drop)
    }

    /// Shut down and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, ScoreError> {
        self.close()?.ok_or(ScoreError::Closed)
    }

    fn close(&mut self) -> Result<Option<W>, ScoreError> {
        match self.state {
            RecorderState::Closed => return Ok(None),
            RecorderState::Failed => return Err(ScoreError::Failed),
            RecorderState::Idle | RecorderState::Recording => {}
        }

        let result = self
            .start()
            .and_then(|()| self.flush_pending())
            .and_then(|()| {
                let writer = self.writer_mut()?;
                writer.write_close()?;
                writer.flush()?;
                Ok(())
            });
        let result = self.check_io(result);
        if self.state == RecorderState::Failed {
            return result.map(|()| None);
        }

        self.state = RecorderState::Closed;
        let writer = self.writer.take();
        result?;

        tracing::info!(records = self.records_written, "score recording closed");
        Ok(writer.map(ScoreWriter::into_inner))
    }

    /// Stop recording for good if `result` is a write failure
    ///
    /// A failed write may have left part of a record in the stream, so
    /// appending anything after it would corrupt the document.
    fn check_io<T>(&mut self, result: Result<T, ScoreError>) -> Result<T, ScoreError> {
        if let Err(ScoreError::Io(e)) = &result {
            if self.state != RecorderState::Failed {
                tracing::error!(records = self.records_written, "score recording failed: {}", e);
            }
            self.state = RecorderState::Failed;
            self.writer = None;
        }
        result
    }

    fn writer_mut(&mut self) -> Result<&mut ScoreWriter<W>, ScoreError> {
        self.writer.as_mut().ok_or(ScoreError::Closed)
    }

    /// Remove the pending group without writing it
    pub fn take_pending(&mut self) -> Option<(u32, Vec<Message>)> {
        self.pending
            .take()
            .map(|group| (group.frame, group.messages))
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Frame of the group waiting to be written, if any
    pub fn pending_frame(&self) -> Option<u32> {
        self.pending.as_ref().map(|group| group.frame)
    }

    /// Number of records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }
}

impl<W: Write> Drop for Recorder<W> {
    fn drop(&mut self) {
        if matches!(self.state, RecorderState::Idle | RecorderState::Recording) {
            if let Err(e) = self.close() {
                tracing::warn!("failed to finalize score: {}", e);
            }
        }
    }
}
