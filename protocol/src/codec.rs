// Newline-delimited JSON framing. One record per line; empty lines are
// tolerated by callers, malformed lines surface as `DecodeError` so the
// connection can drop the record and keep reading.

use crate::messages::Message;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes a message followed by the line terminator.
pub fn encode_line(msg: &Message) -> String {
    // Serialization of our own enum cannot fail: no non-string map keys,
    // no untagged floats at top level.
    let mut line = serde_json::to_string(msg).unwrap_or_default();
    line.push('\n');
    line
}

/// Decodes one line (without requiring the trailing newline to be stripped).
pub fn decode_line(line: &str) -> Result<Message, DecodeError> {
    Ok(serde_json::from_str(line.trim_end())?)
}
