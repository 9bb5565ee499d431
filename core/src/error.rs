//! Error types for score encoding, decoding and recording

use std::io;

/// Error type for score operations
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// The underlying stream could not be opened, read or written
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with a valid score header
    #[error("not a score document: {0}")]
    InvalidHeader(String),

    /// A record (or a packet about to be written) is structurally invalid
    #[error("corrupt data: {0}")]
    Corrupt(#[from] CorruptData),

    /// The recorder has already written its closing marker
    #[error("recorder is already shut down")]
    Closed,

    /// An earlier write failed; the document may hold a partial record
    #[error("recorder stopped after a write failure")]
    Failed,
}

impl ScoreError {
    /// True for errors that only affect a single record
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ScoreError::Corrupt(_))
    }
}

/// Structural faults in a single record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorruptData {
    /// A record with no messages
    #[error("packet at frame {frame} holds no messages")]
    EmptyPacket { frame: u32 },

    /// A message without an address
    #[error("message address is empty")]
    EmptyAddress,

    /// Argument kind outside `s`, `i`, `f`, `d`
    #[error("argument kind '{0}' is invalid or not supported")]
    UnknownKind(char),

    /// Value text that does not parse as its declared kind
    #[error("'{text}' is not a valid '{kind}' value")]
    BadValue { kind: char, text: String },

    /// Text field that is not UTF-8
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// Record body ends before all declared fields were read
    #[error("record body ends early")]
    ShortBody,

    /// Record body has bytes left after the last message
    #[error("{0} unexpected bytes after the last message")]
    TrailingBytes(usize),

    /// Record tag byte is neither a record nor the closing marker
    #[error("unknown record tag 0x{0:02x}")]
    UnknownTag(u8),

    /// Declared record length is beyond the accepted maximum
    #[error("record length {0} exceeds the maximum record size")]
    Oversized(u32),

    /// A field or message list is too large to be framed
    #[error("field of {0} entries is too large to encode")]
    TooLarge(usize),
}
