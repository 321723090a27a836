//! Wire frames and the post-handshake line codec.
//!
//! Every frame is a JSON object discriminated by its `type` field:
//!
//! ```text
//! {"type":"lang","language":"en"}
//! {"type":"chat","text":"hello"}
//! ```
//!
//! After the handshake each frame occupies exactly one line terminated by `\n`.

use serde::{Deserialize, Serialize};

use super::error::ProtocolError;
use crate::lines::LineBuffer;

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frame {
    /// Language announcement sent once by each side during the handshake.
    Lang { language: String },
    /// Chat text, already translated into the receiver's language.
    Chat { text: String },
}

impl Frame {
    pub fn lang(language: impl Into<String>) -> Self {
        Self::Lang {
            language: language.into(),
        }
    }

    pub fn chat(text: impl Into<String>) -> Self {
        Self::Chat { text: text.into() }
    }

    /// Frame type as it appears on the wire.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Lang { .. } => "lang",
            Self::Chat { .. } => "chat",
        }
    }

    /// Serializes the frame as a single JSON object without a delimiter.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(ProtocolError::Malformed)
    }

    /// Serializes the frame as one newline-terminated line.
    pub fn encode_line(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut line = self.encode()?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Incremental decoder for the newline-delimited frame stream.
///
/// Tolerates partial frames, several frames in one chunk and blank lines.
/// A line that fails to parse yields an error for that line only.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    lines: LineBuffer,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of bytes and returns every frame it completes, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<Frame, ProtocolError>> {
        self.lines.extend(chunk);

        let mut decoded = Vec::new();
        while let Some(line) = self.lines.next_line() {
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            decoded.push(serde_json::from_slice::<Frame>(line).map_err(ProtocolError::Malformed));
        }
        decoded
    }

    /// Bytes buffered for an incomplete trailing frame.
    pub fn pending(&self) -> usize {
        self.lines.pending()
    }
}
