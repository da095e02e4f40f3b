//! SSE line and event types.

use crate::models::TelemetryRecord;
use std::time::Duration;

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: message")
    Event(String),
    /// Data payload (e.g., "data: {\"bms\": {}}")
    Data(String),
    /// Event id (e.g., "id: 42")
    Id(String),
    /// Reconnection delay advertised by the server, in milliseconds
    Retry(Duration),
    /// Empty line - signals end of event
    Empty,
    /// Comment line (starts with ':') or a line with an unknown field
    Comment(String),
}

/// Event type used when the server does not send an `event:` line
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// Typed events emitted by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    /// A `message` event whose payload decoded to a telemetry record
    Record(TelemetryRecord),
    /// Any other event type; the dashboard does not consume these
    Other { event_type: String, data: String },
}

impl SseEvent {
    /// Event type name, mainly for logging
    pub fn event_type(&self) -> &str {
        match self {
            SseEvent::Record(_) => DEFAULT_EVENT_TYPE,
            SseEvent::Other { event_type, .. } => event_type,
        }
    }
}

/// Errors raised while turning an SSE event into a typed event
#[derive(Debug, Clone, PartialEq)]
pub enum SseParseError {
    /// Invalid JSON in data payload, or JSON that is not an object
    InvalidJson { event_type: String, source: String },
}

impl std::fmt::Display for SseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SseParseError::InvalidJson { event_type, source } => {
                write!(f, "Invalid JSON for event '{}': {}", event_type, source)
            }
        }
    }
}

impl std::error::Error for SseParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_event_type_name() {
        assert_eq!(SseEvent::Record(TelemetryRecord::default()).event_type(), "message");
        assert_eq!(
            SseEvent::Other {
                event_type: "status".to_string(),
                data: String::new(),
            }
            .event_type(),
            "status"
        );
    }

    #[test]
    fn test_sse_parse_error_display() {
        let err = SseParseError::InvalidJson {
            event_type: "message".to_string(),
            source: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid JSON for event 'message': expected value"
        );
    }
}
