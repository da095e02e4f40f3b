//! SSE (Server-Sent Events) stream parser
//!
//! Parses the SSE framing used by the telemetry server's `/stream` endpoint.
//! SSE format consists of:
//! - `event: <type>` - event type line (defaults to `message`)
//! - `data: <json>` - data payload line(s)
//! - `id: <id>` - event id, echoed back as `Last-Event-ID` on reconnect
//! - `retry: <ms>` - reconnection delay hint
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - Event type definitions (SseEvent, SseLine, SseParseError)
//! - `parser` - Parsing logic (SseParser, parse_sse_line, parse_sse_event)

mod events;
mod parser;

// Re-export public types
pub use events::{SseEvent, SseLine, SseParseError, DEFAULT_EVENT_TYPE};
pub use parser::{parse_sse_event, parse_sse_line, SseParser};
