//! TOML score script parser

use super::ast::ScoreScript;
use crate::error::{CorruptData, ScoreError};
use std::path::Path;
use thiserror::Error;

impl ScoreScript {
    /// Parse a TOML score script from a string
    pub fn from_toml(toml_str: &str) -> Result<Self, ScriptError> {
        toml::from_str(toml_str).map_err(|e| ScriptError::Toml(e.to_string()))
    }

    /// Parse a TOML score script from a file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ScriptError> {
        toml::to_string_pretty(self).map_err(|e| ScriptError::Toml(e.to_string()))
    }
}

/// Errors from parsing, compiling or decompiling a score script
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("TOML error: {0}")]
    Toml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Argument kind that is not a single supported letter
    #[error("unsupported argument type {kind:?} in {address} at frame {frame}")]
    UnsupportedKind {
        frame: u32,
        address: String,
        kind: String,
    },

    #[error("{address} at frame {frame} declares typetag {declared:?} but its args are {actual:?}")]
    TypetagMismatch {
        frame: u32,
        address: String,
        declared: String,
        actual: String,
    },

    #[error("packet at frame {frame} follows frame {previous}")]
    FrameOrder { frame: u32, previous: u32 },

    /// A message or value the score format cannot hold
    #[error("invalid packet at frame {frame}: {source}")]
    InvalidPacket {
        frame: u32,
        #[source]
        source: CorruptData,
    },

    #[error(transparent)]
    Score(#[from] ScoreError),
}
