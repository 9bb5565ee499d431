//! Script decompiler
//!
//! Converts decoded score events back to TOML script form.

use super::ast::{ArgEntry, MessageEntry, PacketEntry, ScoreScript};
use super::parser::ScriptError;
use crate::codec::ScoreHeader;
use crate::codec::text::format_value;
use crate::types::{Event, Message};

/// Decompile score events to a script
///
/// Typetags are always written out so the script documents itself.
///
/// # Errors
///
/// Returns [`ScriptError::InvalidPacket`] for arguments the score format
/// cannot store, which never come out of a [`ScoreReader`](crate::ScoreReader).
pub fn decompile(header: &ScoreHeader, events: &[Event]) -> Result<ScoreScript, ScriptError> {
    let packets = events
        .iter()
        .map(|event| {
            let messages = event
                .packet
                .messages()
                .iter()
                .map(|msg| message_entry(event.frame, msg))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PacketEntry {
                frame: event.frame,
                messages,
            })
        })
        .collect::<Result<Vec<_>, ScriptError>>()?;

    Ok(ScoreScript {
        generator: header.generator.clone(),
        packets,
    })
}

fn message_entry(frame: u32, msg: &Message) -> Result<MessageEntry, ScriptError> {
    let args = msg
        .args()
        .iter()
        .map(|arg| {
            let value =
                format_value(arg).map_err(|source| ScriptError::InvalidPacket { frame, source })?;
            Ok(ArgEntry {
                kind: arg.kind().to_string(),
                value,
            })
        })
        .collect::<Result<Vec<_>, ScriptError>>()?;

    Ok(MessageEntry {
        address: msg.address().to_string(),
        typetag: Some(msg.typetag()),
        args,
    })
}
