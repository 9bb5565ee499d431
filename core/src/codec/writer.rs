//! Score document writer
//!
//! Streams a header, records and the close marker to any `Write`.

use super::text::format_value;
use super::{CLOSE_TAG, MAGIC, MAX_RECORD_SIZE, RECORD_TAG, ScoreHeader};
use crate::error::{CorruptData, ScoreError};
use crate::types::{Message, Packet};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

/// Writer for the score document format
pub struct ScoreWriter<W: Write> {
    writer: W,
    /// Scratch space for the record being encoded
    body: Vec<u8>,
}

impl<W: Write> ScoreWriter<W> {
    /// Create a new score writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            body: Vec::new(),
        }
    }

    /// Write the opening marker and header fields
    pub fn write_header(&mut self, header: &ScoreHeader) -> Result<(), ScoreError> {
        let generator = header.generator.as_bytes();
        let len = field_len(generator.len())?;

        self.writer.write_all(&MAGIC)?;
        self.writer.write_u8(header.version)?;
        self.writer.write_u32::<LittleEndian>(len)?;
        self.writer.write_all(generator)?;
        Ok(())
    }

    /// Encode one record
    ///
    /// The whole record is validated and encoded before anything reaches the
    /// underlying writer, so a rejected packet leaves the stream untouched.
    pub fn write_event(&mut self, frame: u32, packet: &Packet) -> Result<(), ScoreError> {
        self.body.clear();
        encode_body(packet.messages(), &mut self.body)?;

        let len = u32::try_from(self.body.len())
            .ok()
            .filter(|len| *len <= MAX_RECORD_SIZE)
            .ok_or(CorruptData::TooLarge(self.body.len()))?;

        self.writer.write_u8(RECORD_TAG)?;
        self.writer.write_u32::<LittleEndian>(frame)?;
        self.writer.write_u32::<LittleEndian>(len)?;
        self.writer.write_all(&self.body)?;

        tracing::debug!(frame, messages = packet.len(), bytes = len, "score record written");
        Ok(())
    }

    /// Write the close marker
    pub fn write_close(&mut self) -> Result<(), ScoreError> {
        self.writer.write_u8(CLOSE_TAG)?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Check that a message can be stored in a score
pub(crate) fn validate_message(msg: &Message) -> Result<(), CorruptData> {
    if msg.address().is_empty() {
        return Err(CorruptData::EmptyAddress);
    }
    match msg.args().iter().find(|arg| !arg.is_persistable()) {
        Some(arg) => Err(CorruptData::UnknownKind(arg.kind())),
        None => Ok(()),
    }
}

fn encode_body(messages: &[Message], out: &mut Vec<u8>) -> Result<(), CorruptData> {
    let count =
        u16::try_from(messages.len()).map_err(|_| CorruptData::TooLarge(messages.len()))?;
    out.extend_from_slice(&count.to_le_bytes());

    for msg in messages {
        validate_message(msg)?;
        put_str(out, msg.address())?;
        put_str(out, &msg.typetag())?;
        for arg in msg.args() {
            put_str(out, &format_value(arg)?)?;
        }
    }
    Ok(())
}

fn put_str(out: &mut Vec<u8>, s: &str) -> Result<(), CorruptData> {
    let len = field_len(s.len())?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn field_len(len: usize) -> Result<u32, CorruptData> {
    u32::try_from(len)
        .ok()
        .filter(|len| *len <= MAX_RECORD_SIZE)
        .ok_or(CorruptData::TooLarge(len))
}
