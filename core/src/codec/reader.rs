//! Score document reader
//!
//! Decodes one record at a time so a player can stream a score that is
//! still being written, or one that was never closed.

use super::text::parse_value;
use super::{CLOSE_TAG, MAGIC, MAX_RECORD_SIZE, RECORD_TAG, ScoreHeader, VERSION};
use crate::error::{CorruptData, ScoreError};
use crate::types::{Argument, Event, Message, Packet};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom};

/// How a stream of records came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The close marker was read
    Closed,
    /// Input ran out before the close marker (e.g. the recorder crashed)
    Incomplete,
    /// Framing was lost or the input failed; nothing more can be read
    Unreadable,
}

/// Reader for the score document format
pub struct ScoreReader<R: Read> {
    reader: R,
    end: Option<StreamEnd>,
    records_read: u64,
    /// Scratch space for the record being decoded
    body: Vec<u8>,
}

impl<R: Read> ScoreReader<R> {
    /// Create a new score reader positioned at the start of a document
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            end: None,
            records_read: 0,
            body: Vec::new(),
        }
    }

    /// Read the opening marker and header
    ///
    /// On failure the reader is left finished with [`StreamEnd::Unreadable`].
    pub fn read_header(&mut self) -> Result<ScoreHeader, ScoreError> {
        match self.read_header_fields() {
            Ok(header) => {
                self.end = None;
                self.records_read = 0;
                Ok(header)
            }
            Err(e) => {
                self.end = Some(StreamEnd::Unreadable);
                Err(e)
            }
        }
    }

    fn read_header_fields(&mut self) -> Result<ScoreHeader, ScoreError> {
        let truncated = |e: io::Error| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                ScoreError::InvalidHeader("missing or truncated opening marker".to_string())
            }
            _ => ScoreError::Io(e),
        };

        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic).map_err(truncated)?;
        if magic != MAGIC {
            return Err(ScoreError::InvalidHeader(format!(
                "unexpected magic {:02x?}",
                magic
            )));
        }

        let version = self.reader.read_u8().map_err(truncated)?;
        if version != VERSION {
            return Err(ScoreError::InvalidHeader(format!(
                "unsupported version {}",
                version
            )));
        }

        let len = self.reader.read_u32::<LittleEndian>().map_err(truncated)?;
        if len > MAX_RECORD_SIZE {
            return Err(ScoreError::InvalidHeader(format!(
                "generator name of {} bytes",
                len
            )));
        }
        let mut generator = vec![0u8; len as usize];
        self.reader.read_exact(&mut generator).map_err(truncated)?;
        let generator = String::from_utf8(generator)
            .map_err(|_| ScoreError::InvalidHeader("generator is not UTF-8".to_string()))?;

        Ok(ScoreHeader { version, generator })
    }

    /// Decode the next record
    ///
    /// - `Ok(Some(event))` - a record was decoded
    /// - `Ok(None)` - end of stream; see [`ScoreReader::end`] for why
    /// - `Err(ScoreError::Corrupt(_))` - the record was malformed; unless the
    ///   stream became [`StreamEnd::Unreadable`], the next call resumes at the
    ///   following record
    /// - `Err(ScoreError::Io(_))` - the input failed; the stream is finished
    pub fn read_event(&mut self) -> Result<Option<Event>, ScoreError> {
        if self.end.is_some() {
            return Ok(None);
        }

        let Some(tag) = self.read_or_eof(|r| r.read_u8())? else {
            return Ok(None);
        };
        match tag {
            RECORD_TAG => {}
            CLOSE_TAG => {
                self.finish(StreamEnd::Closed);
                return Ok(None);
            }
            other => {
                self.finish(StreamEnd::Unreadable);
                return Err(CorruptData::UnknownTag(other).into());
            }
        }

        let Some(frame) = self.read_or_eof(|r| r.read_u32::<LittleEndian>())? else {
            return Ok(None);
        };
        let Some(len) = self.read_or_eof(|r| r.read_u32::<LittleEndian>())? else {
            return Ok(None);
        };
        if len > MAX_RECORD_SIZE {
            self.finish(StreamEnd::Unreadable);
            return Err(CorruptData::Oversized(len).into());
        }

        let mut body = std::mem::take(&mut self.body);
        body.resize(len as usize, 0);
        let filled = self.read_or_eof(|r| r.read_exact(&mut body));
        self.body = body;
        if filled?.is_none() {
            return Ok(None);
        }

        self.records_read += 1;
        let packet = decode_body(frame, &self.body)?;
        tracing::debug!(frame, messages = packet.len(), "score record read");
        Ok(Some(Event { frame, packet }))
    }

    /// Run a read, mapping a short read to an incomplete end of stream
    fn read_or_eof<T>(
        &mut self,
        read: impl FnOnce(&mut R) -> io::Result<T>,
    ) -> Result<Option<T>, ScoreError> {
        match read(&mut self.reader) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                self.finish(StreamEnd::Incomplete);
                Ok(None)
            }
            Err(e) => {
                self.finish(StreamEnd::Unreadable);
                Err(e.into())
            }
        }
    }

    fn finish(&mut self, end: StreamEnd) {
        match end {
            StreamEnd::Closed => tracing::debug!(records = self.records_read, "score closed"),
            StreamEnd::Incomplete => tracing::warn!(
                records = self.records_read,
                "score ends without a closing marker"
            ),
            StreamEnd::Unreadable => tracing::warn!(
                records = self.records_read,
                "score stream can no longer be read"
            ),
        }
        self.end = Some(end);
    }

    /// Why the stream ended, once it has
    pub fn end(&self) -> Option<StreamEnd> {
        self.end
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// Number of framed records consumed so far (including corrupt ones)
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> ScoreReader<R> {
    /// Seek back to the start of the document and re-read the header
    ///
    /// The reader is left positioned at the first record.
    pub fn rewind(&mut self) -> Result<ScoreHeader, ScoreError> {
        if let Err(e) = self.reader.seek(SeekFrom::Start(0)) {
            self.end = Some(StreamEnd::Unreadable);
            return Err(e.into());
        }
        self.read_header()
    }
}

impl<R: Read> Iterator for ScoreReader<R> {
    type Item = Result<Event, ScoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}

fn decode_body(frame: u32, body: &[u8]) -> Result<Packet, CorruptData> {
    let mut cur = body;

    let count = cur
        .read_u16::<LittleEndian>()
        .map_err(|_| CorruptData::ShortBody)?;
    if count == 0 {
        return Err(CorruptData::EmptyPacket { frame });
    }

    let mut messages = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let address = take_str(&mut cur)?;
        if address.is_empty() {
            return Err(CorruptData::EmptyAddress);
        }

        let typetag = take_str(&mut cur)?;
        let mut args: Vec<Argument> = Vec::with_capacity(typetag.len());
        for kind in typetag.chars() {
            let text = take_str(&mut cur)?;
            args.push(parse_value(kind, text)?);
        }

        messages.push(Message::with_args(address, args));
    }

    if !cur.is_empty() {
        return Err(CorruptData::TrailingBytes(cur.len()));
    }

    Packet::from_messages(messages).ok_or(CorruptData::EmptyPacket { frame })
}

fn take_str<'a>(cur: &mut &'a [u8]) -> Result<&'a str, CorruptData> {
    let len = cur
        .read_u32::<LittleEndian>()
        .map_err(|_| CorruptData::ShortBody)? as usize;
    if len > cur.len() {
        return Err(CorruptData::ShortBody);
    }
    let (bytes, rest) = cur.split_at(len);
    *cur = rest;
    std::str::from_utf8(bytes).map_err(|_| CorruptData::InvalidUtf8)
}
