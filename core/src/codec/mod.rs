//! Score document format (.oscs)
//!
//! Records are framed in binary so a reader can always skip a bad record,
//! while argument values stay in their canonical text form.
//!
//! # File Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Header                                       │
//! │ ├─ magic: "OSCS"                             │
//! │ ├─ version: u8                               │
//! │ └─ generator: str                            │
//! ├──────────────────────────────────────────────┤
//! │ Record (repeated, non-decreasing frames)     │
//! │ ├─ tag: 'R'                                  │
//! │ ├─ frame: u32                                │
//! │ ├─ body_len: u32                             │
//! │ └─ body                                      │
//! │    ├─ message_count: u16                     │
//! │    └─ message × message_count                │
//! │       ├─ address: str                        │
//! │       ├─ typetag: str                        │
//! │       └─ value: str × len(typetag)           │
//! ├──────────────────────────────────────────────┤
//! │ Close marker: 'E'                            │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! `str` is a `u32` byte length followed by UTF-8 bytes. All integers are
//! little-endian. A document without its close marker is incomplete but
//! still readable up to the last whole record.

mod reader;
pub mod text;
mod writer;

pub use reader::{ScoreReader, StreamEnd};
pub use writer::ScoreWriter;
pub(crate) use writer::validate_message;

/// Opening marker
pub const MAGIC: [u8; 4] = *b"OSCS";
/// Current format version
pub const VERSION: u8 = 1;
/// Tag byte starting a record
pub const RECORD_TAG: u8 = b'R';
/// Tag byte closing the document
pub const CLOSE_TAG: u8 = b'E';
/// Largest record body accepted by the reader and produced by the writer
pub const MAX_RECORD_SIZE: u32 = 16 * 1024 * 1024;

/// Document header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreHeader {
    /// Format version
    pub version: u8,
    /// Name of the program that produced the score
    pub generator: String,
}

impl ScoreHeader {
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            version: VERSION,
            generator: generator.into(),
        }
    }
}

impl Default for ScoreHeader {
    fn default() -> Self {
        Self::new("oscscore")
    }
}
