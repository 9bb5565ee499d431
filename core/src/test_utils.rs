//! Shared test utilities for integration and unit tests

use crate::codec::{CLOSE_TAG, RECORD_TAG, ScoreHeader, ScoreWriter};
use crate::types::{Message, Packet};

// ============================================================================
// Reference Messages
// ============================================================================

/// Five messages covering every persistable argument kind, long addresses
/// and long strings
pub fn reference_messages() -> Vec<Message> {
    vec![
        Message::new("/aaa/bbb/xyz/3")
            .with(3.457f32)
            .with("this is a string")
            .with(3.198698469846981f64)
            .with(11),
        Message::new("/zzz/yyy/aaa").with(967).with(21),
        Message::new("/addr666")
            .with(1.34f32)
            .with(-369868)
            .with("The quick brown fox jumps over the lazy dog"),
        Message::new("/a_long_address/pattern/made/up/of/several/parts")
            .with(-12571.34f32)
            .with("test_string_1")
            .with("test_string_2")
            .with("test_string_666")
            .with(-0.89708751f64),
        Message::new("/base/addr1")
            .with("a_string")
            .with("a_string")
            .with("a_string")
            .with(-45),
    ]
}

/// Closed score with records at frames 0, 1 and 3, then a bundle of the
/// last two reference messages at frame 6
pub fn reference_score() -> RawScore {
    let mut messages = reference_messages().into_iter();
    let mut score = RawScore::new();
    for frame in [0, 1, 3] {
        if let Some(msg) = messages.next() {
            score.event(frame, msg);
        }
    }
    if let Some(bundle) = Packet::from_messages(messages.collect()) {
        score.event(6, bundle);
    }
    score.close()
}

// ============================================================================
// Score Builder
// ============================================================================

/// In-memory score document, including records no writer would produce
pub struct RawScore {
    writer: ScoreWriter<Vec<u8>>,
}

impl RawScore {
    pub fn new() -> Self {
        let mut writer = ScoreWriter::new(Vec::new());
        writer
            .write_header(&ScoreHeader::new("test"))
            .expect("header fits in memory");
        Self { writer }
    }

    pub fn event(&mut self, frame: u32, packet: impl Into<Packet>) -> &mut Self {
        self.writer
            .write_event(frame, &packet.into())
            .expect("valid test event");
        self
    }

    /// Single-message record with unchecked typetag and values
    pub fn raw_message_record(
        &mut self,
        frame: u32,
        address: &str,
        typetag: &str,
        values: &[&str],
    ) -> &mut Self {
        let mut body = 1u16.to_le_bytes().to_vec();
        put_str(&mut body, address);
        put_str(&mut body, typetag);
        for value in values {
            put_str(&mut body, value);
        }
        self.raw_record(frame, &body)
    }

    /// Record with an arbitrary body
    pub fn raw_record(&mut self, frame: u32, body: &[u8]) -> &mut Self {
        let out = self.writer.get_mut();
        out.push(RECORD_TAG);
        out.extend_from_slice(&frame.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        self
    }

    pub fn close(mut self) -> Self {
        self.writer.get_mut().push(CLOSE_TAG);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}
