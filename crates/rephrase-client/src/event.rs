use serde_json::Value;
use tracing::warn;

use crate::errors::DecodeError;
use crate::sse::Frame;

/// Literal prefix of a payload line.
pub const DATA_PREFIX: &str = "data: ";

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Incremental text to append to the output for `style`.
    Content { style: String, content: String },
    /// In-band failure reported by the server. Terminal.
    Error { message: String },
    /// Decoded successfully but carries nothing to apply.
    Noop(Heartbeat),
}

/// Which benign marker a no-op frame carried. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heartbeat {
    /// No payload, a blank payload, `{}`, or a payload without a `type`.
    Empty,
    /// Server began producing output for a style.
    StyleStart { style: String },
    /// Server finished producing output for a style.
    StyleEnd { style: String },
    /// Server finished every style. Transport end-of-stream stays authoritative.
    Complete,
    /// A `type` this client does not know.
    Unknown { kind: String },
    /// A known `type` without the fields it requires.
    Incomplete { kind: String },
}

/// Decodes one frame into an [`Event`].
///
/// Only lines starting with `data: ` carry payload; other lines are ignored.
/// Several payload lines are joined with `\n` before parsing.
pub fn decode(frame: &Frame) -> Result<Event, DecodeError> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix(DATA_PREFIX))
        .collect();
    if data_lines.is_empty() {
        return Ok(Event::Noop(Heartbeat::Empty));
    }
    let payload = data_lines.join("\n");
    if payload.trim().is_empty() {
        return Ok(Event::Noop(Heartbeat::Empty));
    }
    let value: Value = serde_json::from_str(&payload).map_err(|source| DecodeError {
        payload: payload.clone(),
        source,
    })?;
    Ok(map_payload(&value))
}

fn map_payload(value: &Value) -> Event {
    let Some(kind) = value.get("type").and_then(|v| v.as_str()) else {
        return Event::Noop(Heartbeat::Empty);
    };
    let field = |name: &str| value.get(name).and_then(|v| v.as_str()).map(ToOwned::to_owned);
    match kind {
        "content" => match (field("style"), field("content")) {
            (Some(style), Some(content)) => Event::Content { style, content },
            _ => incomplete(kind),
        },
        "error" => match field("message") {
            Some(message) => Event::Error { message },
            None => incomplete(kind),
        },
        "style_start" => match field("style") {
            Some(style) => Event::Noop(Heartbeat::StyleStart { style }),
            None => incomplete(kind),
        },
        "style_end" => match field("style") {
            Some(style) => Event::Noop(Heartbeat::StyleEnd { style }),
            None => incomplete(kind),
        },
        "complete" => Event::Noop(Heartbeat::Complete),
        other => Event::Noop(Heartbeat::Unknown {
            kind: other.to_string(),
        }),
    }
}

fn incomplete(kind: &str) -> Event {
    warn!(kind, "stream event is missing required fields; ignoring");
    Event::Noop(Heartbeat::Incomplete {
        kind: kind.to_string(),
    })
}
