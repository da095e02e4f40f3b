//! SSE stream parsing logic
//!
//! Contains the stateful SseParser for accumulating lines and emitting events,
//! as well as the core parsing functions.

use std::time::Duration;

use crate::models::TelemetryRecord;
use crate::sse::events::{SseEvent, SseLine, SseParseError, DEFAULT_EVENT_TYPE};

/// Strip the single optional space that follows the field colon
fn field_value(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest)
}

/// Parse a single SSE line into its component type
///
/// A line without a colon is a field name with an empty value.
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    let (field, value) = match line.split_once(':') {
        Some((field, rest)) => (field, field_value(rest)),
        None => (line, ""),
    };

    match field {
        "event" => SseLine::Event(value.trim().to_string()),
        "data" => SseLine::Data(value.to_string()),
        "id" => SseLine::Id(value.to_string()),
        "retry" => {
            // Only ASCII digits are valid; anything else is ignored
            if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(ms) = value.parse::<u64>() {
                    return SseLine::Retry(Duration::from_millis(ms));
                }
            }
            SseLine::Comment(line.to_string())
        }
        // Unknown field - treat as comment
        _ => SseLine::Comment(line.to_string()),
    }
}

/// Parse SSE event type and data into a typed SseEvent
pub fn parse_sse_event(event_type: &str, data: &str) -> Result<SseEvent, SseParseError> {
    match event_type {
        DEFAULT_EVENT_TYPE => TelemetryRecord::from_json(data)
            .map(SseEvent::Record)
            .map_err(|e| SseParseError::InvalidJson {
                event_type: event_type.to_string(),
                source: e.to_string(),
            }),
        _ => Ok(SseEvent::Other {
            event_type: event_type.to_string(),
            data: data.to_string(),
        }),
    }
}

/// Stateful SSE parser that accumulates lines and emits complete events
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event type being accumulated
    current_event_type: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
    /// Last event id seen; persists across events
    last_event_id: Option<String>,
    /// Reconnection delay most recently advertised by the server
    retry: Option<Duration>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line to the parser, potentially returning a complete event
    ///
    /// Returns:
    /// - `Ok(Some(event))` - A complete event was parsed
    /// - `Ok(None)` - Line was consumed but event is incomplete
    /// - `Err(error)` - The completed event's payload could not be decoded
    pub fn feed_line(&mut self, line: &str) -> Result<Option<SseEvent>, SseParseError> {
        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                self.current_event_type = Some(event_type);
                Ok(None)
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                Ok(None)
            }
            SseLine::Id(id) => {
                // An id containing NUL is ignored
                if !id.contains('\0') {
                    self.last_event_id = if id.is_empty() { None } else { Some(id) };
                }
                Ok(None)
            }
            SseLine::Retry(delay) => {
                self.retry = Some(delay);
                Ok(None)
            }
            SseLine::Empty => self.try_emit_event(),
            SseLine::Comment(_) => Ok(None),
        }
    }

    /// Try to emit a complete event from accumulated state
    fn try_emit_event(&mut self) -> Result<Option<SseEvent>, SseParseError> {
        let event_type = self.current_event_type.take();

        // Events without data are not dispatched
        if self.data_buffer.is_empty() {
            return Ok(None);
        }

        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();

        let event_type = match event_type {
            Some(et) if !et.is_empty() => et,
            _ => DEFAULT_EVENT_TYPE.to_string(),
        };

        parse_sse_event(&event_type, &data).map(Some)
    }

    /// Last event id received, sent back as `Last-Event-ID` on reconnect
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reconnection delay advertised by the server, if any
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }
}
