//! Script compiler
//!
//! Converts parsed TOML scripts into timed events, checking every value
//! against the same text rules the codec uses.

use super::ast::{MessageEntry, ScoreScript};
use super::parser::ScriptError;
use crate::codec::text::{SUPPORTED_KINDS, parse_value};
use crate::codec::{ScoreHeader, ScoreWriter, validate_message};
use crate::error::CorruptData;
use crate::types::{Event, Message, Packet};
use std::io::Write;

/// Compile a script into events in document order
///
/// # Errors
///
/// Fails on the first packet that is empty, out of frame order, or holds a
/// message the score format cannot store.
pub fn compile(script: &ScoreScript) -> Result<Vec<Event>, ScriptError> {
    let mut events = Vec::with_capacity(script.packets.len());
    let mut previous: Option<u32> = None;

    for entry in &script.packets {
        let frame = entry.frame;
        if let Some(previous) = previous.filter(|previous| frame < *previous) {
            return Err(ScriptError::FrameOrder { frame, previous });
        }
        previous = Some(frame);

        let messages = entry
            .messages
            .iter()
            .map(|msg| compile_message(frame, msg))
            .collect::<Result<Vec<_>, _>>()?;
        let packet = Packet::from_messages(messages).ok_or(ScriptError::InvalidPacket {
            frame,
            source: CorruptData::EmptyPacket { frame },
        })?;

        events.push(Event { frame, packet });
    }

    Ok(events)
}

/// Compile a script and write it as a closed score document
///
/// Nothing is written unless the whole script compiles.
pub fn compile_to_writer<W: Write>(script: &ScoreScript, writer: W) -> Result<W, ScriptError> {
    let events = compile(script)?;
    write_events(&script.generator, &events, writer)
}

/// Write already compiled events as a closed score document
pub fn write_events<W: Write>(
    generator: &str,
    events: &[Event],
    writer: W,
) -> Result<W, ScriptError> {
    let mut out = ScoreWriter::new(writer);
    out.write_header(&ScoreHeader::new(generator))?;
    for event in events {
        out.write_event(event.frame, &event.packet)?;
    }
    out.write_close()?;
    out.flush()?;

    tracing::info!(records = events.len(), "score compiled");
    Ok(out.into_inner())
}

fn compile_message(frame: u32, entry: &MessageEntry) -> Result<Message, ScriptError> {
    let invalid = |source| ScriptError::InvalidPacket { frame, source };

    let mut msg = Message::new(entry.address.as_str());
    for arg in &entry.args {
        let mut chars = arg.kind.chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(kind), None) if SUPPORTED_KINDS.contains(&kind) => kind,
            _ => {
                return Err(ScriptError::UnsupportedKind {
                    frame,
                    address: entry.address.clone(),
                    kind: arg.kind.clone(),
                });
            }
        };
        msg.push(parse_value(kind, &arg.value).map_err(invalid)?);
    }
    validate_message(&msg).map_err(invalid)?;

    if let Some(declared) = &entry.typetag {
        let actual = msg.typetag();
        if *declared != actual {
            return Err(ScriptError::TypetagMismatch {
                frame,
                address: entry.address.clone(),
                declared: declared.clone(),
                actual,
            });
        }
    }

    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ScoreReader;
    use crate::script::{ArgEntry, PacketEntry};
    use crate::test_utils::reference_messages;
    use crate::types::Argument;

    fn arg(kind: &str, value: &str) -> ArgEntry {
        ArgEntry {
            kind: kind.to_string(),
            value: value.to_string(),
        }
    }

    fn message(address: &str, args: Vec<ArgEntry>) -> MessageEntry {
        MessageEntry {
            address: address.to_string(),
            typetag: None,
            args,
        }
    }

    fn script(packets: Vec<PacketEntry>) -> ScoreScript {
        ScoreScript {
            generator: "test".to_string(),
            packets,
        }
    }

    #[test]
    fn test_compile_single_and_bundle() {
        let events = compile(&script(vec![
            PacketEntry {
                frame: 1,
                messages: vec![message("/zzz/yyy/aaa", vec![arg("i", "967"), arg("i", "21")])],
            },
            PacketEntry {
                frame: 6,
                messages: vec![
                    message("/a", vec![arg("f", "-12571.34")]),
                    message("/b", vec![arg("d", "-0.89708751"), arg("s", "x")]),
                ],
            },
        ]))
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            Event::new(1, reference_messages()[1].clone())
        );
        assert!(events[1].packet.is_bundle());
        assert_eq!(
            events[1].packet.messages()[1].args(),
            &[Argument::Double(-0.89708751), Argument::String("x".into())]
        );
    }

    #[test]
    fn test_compile_checks_typetag() {
        let mut entry = message("/a", vec![arg("i", "1"), arg("s", "x")]);
        entry.typetag = Some("is".to_string());
        let ok = script(vec![PacketEntry {
            frame: 0,
            messages: vec![entry.clone()],
        }]);
        assert!(compile(&ok).is_ok());

        entry.typetag = Some("si".to_string());
        let bad = script(vec![PacketEntry {
            frame: 0,
            messages: vec![entry],
        }]);
        assert!(matches!(
            compile(&bad),
            Err(ScriptError::TypetagMismatch { ref actual, .. }) if actual == "is"
        ));
    }

    #[test]
    fn test_compile_rejects_frame_regression() {
        let result = compile(&script(vec![
            PacketEntry {
                frame: 5,
                messages: vec![message("/a", vec![])],
            },
            PacketEntry {
                frame: 5,
                messages: vec![message("/b", vec![])],
            },
            PacketEntry {
                frame: 2,
                messages: vec![message("/c", vec![])],
            },
        ]));
        assert!(matches!(
            result,
            Err(ScriptError::FrameOrder {
                frame: 2,
                previous: 5
            })
        ));
    }

    #[test]
    fn test_compile_rejects_bad_entries() {
        let unsupported = script(vec![PacketEntry {
            frame: 0,
            messages: vec![message("/a", vec![arg("h", "1")])],
        }]);
        assert!(matches!(
            compile(&unsupported),
            Err(ScriptError::UnsupportedKind { .. })
        ));

        let bad_value = script(vec![PacketEntry {
            frame: 0,
            messages: vec![message("/a", vec![arg("i", "1.5")])],
        }]);
        assert!(matches!(
            compile(&bad_value),
            Err(ScriptError::InvalidPacket {
                source: CorruptData::BadValue { kind: 'i', .. },
                ..
            })
        ));

        let empty = script(vec![PacketEntry {
            frame: 9,
            messages: vec![],
        }]);
        assert!(matches!(
            compile(&empty),
            Err(ScriptError::InvalidPacket {
                source: CorruptData::EmptyPacket { frame: 9 },
                ..
            })
        ));

        let no_address = script(vec![PacketEntry {
            frame: 0,
            messages: vec![message("", vec![])],
        }]);
        assert!(matches!(
            compile(&no_address),
            Err(ScriptError::InvalidPacket {
                source: CorruptData::EmptyAddress,
                ..
            })
        ));
    }

    #[test]
    fn test_compile_to_writer_produces_closed_score() {
        let bytes = compile_to_writer(
            &script(vec![PacketEntry {
                frame: 2,
                messages: vec![message("/x", vec![arg("s", "hello")])],
            }]),
            Vec::new(),
        )
        .unwrap();

        let mut reader = ScoreReader::new(bytes.as_slice());
        assert_eq!(reader.read_header().unwrap().generator, "test");
        let event = reader.read_event().unwrap().unwrap();
        assert_eq!(event, Event::new(2, Message::new("/x").with("hello")));
        assert_eq!(reader.read_event().unwrap(), None);
        assert_eq!(reader.end(), Some(crate::codec::StreamEnd::Closed));
    }

    #[test]
    fn test_compile_to_writer_writes_nothing_on_error() {
        let mut out = Vec::new();
        let result = compile_to_writer(
            &script(vec![PacketEntry {
                frame: 0,
                messages: vec![message("/a", vec![arg("q", "1")])],
            }]),
            &mut out,
        );
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_events_without_packets() {
        let bytes = write_events("empty", &[], Vec::new()).unwrap();

        let mut reader = ScoreReader::new(bytes.as_slice());
        assert_eq!(reader.read_header().unwrap().generator, "empty");
        assert_eq!(reader.read_event().unwrap(), None);
        assert_eq!(reader.end(), Some(crate::codec::StreamEnd::Closed));
    }
}
