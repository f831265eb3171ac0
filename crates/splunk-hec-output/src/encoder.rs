use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// One formatted event, framed for buffering. The tag travels alongside the
/// line rather than inside it so grouping never has to re-parse the payload.
///
/// Serialized as a compact MessagePack `[tag, line]` tuple; a buffered chunk
/// is a back-to-back stream of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedEntry {
    pub tag: String,
    pub line: String,
}

/// Rendering of the event timestamp into the line prefix. Selected once at
/// configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// No prefix; the line is the bare record rendering.
    None,
    /// `"<epoch seconds>: "` prefix.
    EpochSeconds,
}

impl TimestampFormat {
    fn prefix(self, timestamp: u64) -> Option<String> {
        match self {
            TimestampFormat::None => None,
            TimestampFormat::EpochSeconds => Some(format!("{timestamp}: ")),
        }
    }
}

/// Turns `(tag, timestamp, record)` into a buffered [`EncodedEntry`]. Pure;
/// performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct EventEncoder {
    time_format: TimestampFormat,
}

impl Default for EventEncoder {
    fn default() -> Self {
        EventEncoder {
            time_format: TimestampFormat::EpochSeconds,
        }
    }
}

impl EventEncoder {
    pub fn new(time_format: TimestampFormat) -> Self {
        EventEncoder { time_format }
    }

    /// Renders the record as a JSON line (optionally timestamp-prefixed,
    /// always newline-terminated) and frames it with the tag for buffering.
    pub fn encode(
        &self,
        tag: &str,
        timestamp: u64,
        record: &serde_json::Value,
    ) -> Result<Vec<u8>, EncodeError> {
        let time_str = self.time_format.prefix(timestamp).unwrap_or_default();
        let rendered = serde_json::to_string(record)
            .map_err(|e| EncodeError(format!("unserializable record: {e}")))?;
        let entry = EncodedEntry {
            tag: tag.to_string(),
            line: format!("{time_str}{rendered}\n"),
        };
        rmp_serde::to_vec(&entry).map_err(|e| EncodeError(e.to_string()))
    }
}
