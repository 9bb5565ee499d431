//! Score script AST types.

use serde::{Deserialize, Serialize};

/// Complete score script file (TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreScript {
    /// Name of the program that produced the score
    #[serde(default = "default_generator")]
    pub generator: String,

    /// Packets in frame order
    #[serde(default)]
    pub packets: Vec<PacketEntry>,
}

fn default_generator() -> String {
    "oscscore".to_string()
}

/// One timed packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketEntry {
    /// Frame the packet is delivered at
    pub frame: u32,

    /// One message, or several for a bundle
    pub messages: Vec<MessageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub address: String,

    /// Declared kinds, checked against `args` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typetag: Option<String>,

    #[serde(default)]
    pub args: Vec<ArgEntry>,
}

/// Argument in its canonical text form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgEntry {
    /// Kind letter (`s`, `i`, `f` or `d`)
    #[serde(rename = "type")]
    pub kind: String,

    pub value: String,
}
