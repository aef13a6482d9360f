use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// Prefix of every REST route.
pub const API_PREFIX: &str = "/api/v1";

/// Path of the snapshot SSE stream, relative to [`API_PREFIX`].
pub const SNAPSHOT_STREAM_PATH: &str = "/games/stream";

/// SSE event name carrying a full collection snapshot.
pub const SNAPSHOT_EVENT: &str = "snapshot";

/// Maximum accepted size in bytes for request and response bodies.
/// Snapshot frames are bounded by the collection's game limit instead.
pub const MAX_MESSAGE_SIZE: usize = 256 * 1024;

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

fn to_json<T: Serialize>(payload: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(payload).map_err(|e| ProtocolError::SerializeError(e.to_string()))
}

fn from_json<T: for<'de> Deserialize<'de>>(data: &str) -> Result<T, ProtocolError> {
    if data.trim().is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    serde_json::from_str(data).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

/// Encode a payload as JSON text, enforcing the size cap.
pub fn encode_json<T: Serialize>(payload: &T) -> Result<String, ProtocolError> {
    let text = to_json(payload)?;
    if text.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(text.len()));
    }
    Ok(text)
}

/// Decode a JSON payload, rejecting empty or oversized input.
pub fn decode_json<T: for<'de> Deserialize<'de>>(data: &str) -> Result<T, ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(data.len()));
    }
    from_json(data)
}

/// Encode a snapshot as the data field of an SSE `snapshot` event.
///
/// Not subject to [`MAX_MESSAGE_SIZE`]: every valid catalog up to the
/// configured game limit must stream.
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, ProtocolError> {
    to_json(snapshot)
}

/// Decode the data field of an SSE `snapshot` event.
pub fn decode_snapshot(data: &str) -> Result<Snapshot, ProtocolError> {
    from_json(data)
}
