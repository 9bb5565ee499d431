//! Canonical text form of argument values
//!
//! - `s`: the string verbatim
//! - `i`: base-10 `i32`
//! - `f` / `d`: shortest decimal that parses back to the same bits
//!
//! NaN is the one value without a bit-exact text form; it reads back as the
//! canonical quiet NaN.

use crate::error::CorruptData;
use crate::types::Argument;

/// Kinds the score format stores
pub const SUPPORTED_KINDS: [char; 4] = ['s', 'i', 'f', 'd'];

/// Render an argument value as text
pub fn format_value(arg: &Argument) -> Result<String, CorruptData> {
    match arg {
        Argument::String(s) => Ok(s.clone()),
        Argument::Int(v) => Ok(v.to_string()),
        Argument::Float(v) => Ok(v.to_string()),
        Argument::Double(v) => Ok(v.to_string()),
        other => Err(CorruptData::UnknownKind(other.kind())),
    }
}

/// Parse the text form of a value of the given kind
pub fn parse_value(kind: char, text: &str) -> Result<Argument, CorruptData> {
    let bad_value = || CorruptData::BadValue {
        kind,
        text: text.to_string(),
    };

    match kind {
        's' => Ok(Argument::String(text.to_string())),
        'i' => text.parse().map(Argument::Int).map_err(|_| bad_value()),
        'f' => text.parse().map(Argument::Float).map_err(|_| bad_value()),
        'd' => text.parse().map(Argument::Double).map_err(|_| bad_value()),
        other => Err(CorruptData::UnknownKind(other)),
    }
}
