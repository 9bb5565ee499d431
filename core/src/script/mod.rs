//! Score script format (.toml)
//!
//! A human-readable rendition of a score document for hand-written test
//! scores and for inspecting recordings.
//!
//! # Example Script
//!
//! ```toml
//! generator = "sketch"
//!
//! [[packets]]
//! frame = 0
//!
//! [[packets.messages]]
//! address = "/aaa/bbb/xyz/3"
//! typetag = "fsdi"
//! args = [
//!   { type = "f", value = "3.457" },
//!   { type = "s", value = "this is a string" },
//!   { type = "d", value = "3.198698469846981" },
//!   { type = "i", value = "11" },
//! ]
//! ```
//!
//! A packet entry with more than one message compiles to a bundle. The
//! `typetag` field is optional; when present it must match the argument kinds.

mod ast;
mod compiler;
mod decompiler;
mod parser;

pub use ast::{ArgEntry, MessageEntry, PacketEntry, ScoreScript};
pub use compiler::{compile, compile_to_writer, write_events};
pub use decompiler::decompile;
pub use parser::ScriptError;
