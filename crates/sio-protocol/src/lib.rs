//! Wire codec for the Socket.IO 0.6 frame format.
//!
//! A frame is `~m~<len>~m~<payload>` where `len` is the byte length of
//! `payload`. `payload` optionally opens with a 3-byte tag: `~j~` marks a
//! JSON message, `~h~` marks a heartbeat; the absence of a tag marks Text.
//! The outer `~m~` is a length-prefixed delimiter, not an escape — a Text
//! payload whose bytes happen to equal `~m~` still round-trips because the
//! length prefix, not delimiter scanning, decides where the payload ends.

use serde_json::ser::Formatter;
use std::io;

pub const FRAME_DELIM: &str = "~m~";
pub const JSON_TAG: &str = "~j~";
pub const HEARTBEAT_TAG: &str = "~h~";

/// An application-level message as defined by the data model.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    Json(serde_json::Value),
    Heartbeat(u64),
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Text(s)
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Text(s.to_owned())
    }
}

impl From<serde_json::Value> for Message {
    fn from(v: serde_json::Value) -> Self {
        Message::Json(v)
    }
}

/// A single decoded wire frame, tagged by the kind its payload carried.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    Text(String),
    Json(serde_json::Value),
    Heartbeat(u64),
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("expected frame delimiter at byte offset {0}")]
    MissingDelimiter(usize),
    #[error("malformed or missing length prefix at byte offset {0}")]
    InvalidLength(usize),
    #[error("frame at offset {0} declares payload length {1} but only {2} bytes remain")]
    TruncatedPayload(usize, usize, usize),
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid heartbeat counter payload: {0:?}")]
    InvalidHeartbeat(String),
}

/// Matches the separator style of the Socket.IO 0.6 reference server's
/// JSON encoder (`", "` / `": "`) so the byte-accurate wire vectors in the
/// 0.6 client/server contract round-trip unchanged.
struct CompatFormatter;

impl Formatter for CompatFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn json_to_bytes(value: &serde_json::Value) -> Vec<u8> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, CompatFormatter);
    // `Value` serialization cannot fail.
    serde::Serialize::serialize(value, &mut ser).expect("Value always serializes");
    out
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_DELIM.len() * 2 + 8 + payload.len());
    out.extend_from_slice(FRAME_DELIM.as_bytes());
    out.extend_from_slice(payload.len().to_string().as_bytes());
    out.extend_from_slice(FRAME_DELIM.as_bytes());
    out.extend_from_slice(payload);
    out
}

impl Message {
    /// Encodes this single message as one wire frame.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Message::Text(s) => frame(s.as_bytes()),
            Message::Json(value) => {
                let mut payload = Vec::with_capacity(JSON_TAG.len() + 16);
                payload.extend_from_slice(JSON_TAG.as_bytes());
                payload.extend_from_slice(&json_to_bytes(value));
                frame(&payload)
            }
            Message::Heartbeat(counter) => {
                let mut payload = Vec::with_capacity(HEARTBEAT_TAG.len() + 8);
                payload.extend_from_slice(HEARTBEAT_TAG.as_bytes());
                payload.extend_from_slice(counter.to_string().as_bytes());
                frame(&payload)
            }
        }
    }
}

/// Encodes a sequence of messages as the concatenation of each message's
/// own frame encoding. There is no outer wrapper around the sequence.
pub fn encode(messages: &[Message]) -> Vec<u8> {
    let mut out = Vec::new();
    for message in messages {
        out.extend(message.encode());
    }
    out
}

/// Decodes a buffer of one or more concatenated frames.
///
/// Stops cleanly at end of input. A malformed length prefix or a payload
/// that runs past the end of the buffer is a [`CodecError`].
pub fn decode(bytes: &[u8]) -> Result<Vec<DecodedFrame>, CodecError> {
    let delim = FRAME_DELIM.as_bytes();
    let mut frames = Vec::new();
    let mut idx = 0usize;

    while idx < bytes.len() {
        if !bytes[idx..].starts_with(delim) {
            return Err(CodecError::MissingDelimiter(idx));
        }
        idx += delim.len();

        let len_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == len_start {
            return Err(CodecError::InvalidLength(len_start));
        }
        let len_str =
            std::str::from_utf8(&bytes[len_start..idx]).map_err(|_| CodecError::InvalidLength(len_start))?;
        let payload_len: usize = len_str
            .parse()
            .map_err(|_| CodecError::InvalidLength(len_start))?;

        if !bytes[idx..].starts_with(delim) {
            return Err(CodecError::MissingDelimiter(idx));
        }
        idx += delim.len();

        if idx + payload_len > bytes.len() {
            return Err(CodecError::TruncatedPayload(
                idx,
                payload_len,
                bytes.len() - idx,
            ));
        }
        let payload = &bytes[idx..idx + payload_len];
        idx += payload_len;

        frames.push(decode_payload(payload)?);
    }

    Ok(frames)
}

fn decode_payload(payload: &[u8]) -> Result<DecodedFrame, CodecError> {
    if let Some(json_bytes) = payload.strip_prefix(JSON_TAG.as_bytes()) {
        let value: serde_json::Value = serde_json::from_slice(json_bytes)?;
        return Ok(DecodedFrame::Json(value));
    }
    if let Some(counter_bytes) = payload.strip_prefix(HEARTBEAT_TAG.as_bytes()) {
        let counter_str = std::str::from_utf8(counter_bytes).map_err(|_| CodecError::InvalidUtf8)?;
        let counter: u64 = counter_str
            .parse()
            .map_err(|_| CodecError::InvalidHeartbeat(counter_str.to_owned()))?;
        return Ok(DecodedFrame::Heartbeat(counter));
    }
    let text = std::str::from_utf8(payload).map_err(|_| CodecError::InvalidUtf8)?;
    Ok(DecodedFrame::Text(text.to_owned()))
}
