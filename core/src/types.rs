//! Core types for the score system
//!
//! This module defines the in-memory message model shared by the codec,
//! the recorder and the player:
//!
//! - [`Argument`] - one typed OSC argument
//! - [`Message`] - an address plus an ordered argument list
//! - [`Packet`] - a single message or a bundle captured at the same frame
//! - [`Event`] - a packet scheduled at a frame

use std::fmt;

/// Typed OSC argument
///
/// Only `s`, `i`, `f` and `d` arguments can be persisted in a score. The
/// remaining kinds exist because a live OSC source can produce them; the
/// codec rejects them with [`CorruptData::UnknownKind`](crate::CorruptData).
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// `s` - UTF-8 string
    String(String),
    /// `i` - 32-bit signed integer
    Int(i32),
    /// `f` - 32-bit float
    Float(f32),
    /// `d` - 64-bit float
    Double(f64),
    /// `h` - 64-bit signed integer
    Long(i64),
    /// `b` - opaque blob
    Blob(Vec<u8>),
    /// `T` / `F` - boolean
    Bool(bool),
    /// `N` - nil
    Nil,
}

impl Argument {
    /// Typetag character for this argument
    pub fn kind(&self) -> char {
        match self {
            Argument::String(_) => 's',
            Argument::Int(_) => 'i',
            Argument::Float(_) => 'f',
            Argument::Double(_) => 'd',
            Argument::Long(_) => 'h',
            Argument::Blob(_) => 'b',
            Argument::Bool(true) => 'T',
            Argument::Bool(false) => 'F',
            Argument::Nil => 'N',
        }
    }

    /// Whether the score format can store this argument
    pub fn is_persistable(&self) -> bool {
        matches!(
            self,
            Argument::String(_) | Argument::Int(_) | Argument::Float(_) | Argument::Double(_)
        )
    }
}

impl From<i32> for Argument {
    fn from(v: i32) -> Self {
        Argument::Int(v)
    }
}

impl From<f32> for Argument {
    fn from(v: f32) -> Self {
        Argument::Float(v)
    }
}

impl From<f64> for Argument {
    fn from(v: f64) -> Self {
        Argument::Double(v)
    }
}

impl From<i64> for Argument {
    fn from(v: i64) -> Self {
        Argument::Long(v)
    }
}

impl From<bool> for Argument {
    fn from(v: bool) -> Self {
        Argument::Bool(v)
    }
}

impl From<&str> for Argument {
    fn from(v: &str) -> Self {
        Argument::String(v.to_string())
    }
}

impl From<String> for Argument {
    fn from(v: String) -> Self {
        Argument::String(v)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(v: Vec<u8>) -> Self {
        Argument::Blob(v)
    }
}

/// OSC message: address pattern plus ordered arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    address: String,
    args: Vec<Argument>,
}

impl Message {
    /// Create a message with no arguments
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            args: Vec::new(),
        }
    }

    /// Create a message from an address and a prepared argument list
    pub fn with_args(address: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Append an argument (builder style)
    pub fn with(mut self, arg: impl Into<Argument>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append an argument
    pub fn push(&mut self, arg: impl Into<Argument>) {
        self.args.push(arg.into());
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Typetag derived from the argument kinds, in order
    pub fn typetag(&self) -> String {
        self.args.iter().map(Argument::kind).collect()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let typetag = self.typetag();
        if typetag.is_empty() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{} {}", self.address, typetag)
        }
    }
}

/// Two or more messages captured at the same frame
///
/// A bundle never holds fewer than two messages; a lone message is always a
/// [`Packet::Single`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle(Vec<Message>);

impl Bundle {
    /// Build a bundle, handing the messages back if there are fewer than two
    pub fn new(messages: Vec<Message>) -> Result<Self, Vec<Message>> {
        if messages.len() < 2 {
            return Err(messages);
        }
        Ok(Self(messages))
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.0
    }
}

/// Unit of delivery: a single message or a bundle
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Single(Message),
    Bundle(Bundle),
}

impl Packet {
    /// Wrap a message list: one message becomes `Single`, more become `Bundle`
    ///
    /// Returns `None` for an empty list.
    pub fn from_messages(mut messages: Vec<Message>) -> Option<Self> {
        match messages.len() {
            0 => None,
            1 => messages.pop().map(Packet::Single),
            _ => Bundle::new(messages).ok().map(Packet::Bundle),
        }
    }

    /// Messages in delivery order
    pub fn messages(&self) -> &[Message] {
        match self {
            Packet::Single(msg) => std::slice::from_ref(msg),
            Packet::Bundle(bundle) => bundle.messages(),
        }
    }

    pub fn into_messages(self) -> Vec<Message> {
        match self {
            Packet::Single(msg) => vec![msg],
            Packet::Bundle(bundle) => bundle.into_messages(),
        }
    }

    /// Number of messages carried
    pub fn len(&self) -> usize {
        self.messages().len()
    }

    /// Always false: a packet carries at least one message
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self, Packet::Bundle(_))
    }
}

impl From<Message> for Packet {
    fn from(msg: Message) -> Self {
        Packet::Single(msg)
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Single(msg) => write!(f, "{}", msg),
            Packet::Bundle(bundle) => {
                write!(f, "bundle[")?;
                for (i, msg) in bundle.messages().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", msg)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A packet scheduled at a frame
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Frame number the packet was captured at / is due at
    pub frame: u32,
    pub packet: Packet,
}

impl Event {
    pub fn new(frame: u32, packet: impl Into<Packet>) -> Self {
        Self {
            frame,
            packet: packet.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame: {} - Packet: {}", self.frame, self.packet)
    }
}
