//! Streaming-related error types.
//!
//! This module defines errors that occur while opening and reading the
//! telemetry event stream.

use thiserror::Error;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// Could not reach the server at all.
    #[error("Failed to connect to {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    /// Server answered with a non-success status.
    #[error("Server returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Server answered, but not with an event stream.
    #[error("Endpoint is not an event stream (content type: {content_type})")]
    NotEventStream { content_type: String },

    /// Stream connection was lost unexpectedly.
    #[error("Stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// Server ended the response body.
    #[error("Server closed stream")]
    ServerClosed,

    /// A payload could not be decoded into a telemetry record.
    #[error("Invalid {event_type} payload: {message}")]
    InvalidPayload { event_type: String, message: String },

    /// Reconnection gave up.
    #[error("Gave up reconnecting after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl StreamError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::ConnectionFailed { .. }
            | StreamError::ConnectionLost { .. }
            | StreamError::ServerClosed => true,
            StreamError::HttpStatus { status } => *status >= 500,
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionFailed { url, .. } => {
                format!("Cannot reach {}. Retrying...", url)
            }
            StreamError::HttpStatus { status } if *status >= 500 => {
                format!("Server error (HTTP {}). Retrying...", status)
            }
            StreamError::HttpStatus { status } => {
                format!("Stream endpoint unavailable (HTTP {}).", status)
            }
            StreamError::NotEventStream { .. } => {
                "Endpoint does not serve an event stream.".to_string()
            }
            StreamError::ConnectionLost { .. } => {
                "Connection to the server was lost. Reconnecting...".to_string()
            }
            StreamError::ServerClosed => "Server closed the stream. Reconnecting...".to_string(),
            StreamError::InvalidPayload { .. } => {
                "Skipped a malformed telemetry message.".to_string()
            }
            StreamError::RetriesExhausted { attempts } => {
                format!("Disconnected after {} reconnection attempts.", attempts)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionFailed { .. } => "E_STREAM_CONNECT",
            StreamError::HttpStatus { .. } => "E_STREAM_HTTP",
            StreamError::NotEventStream { .. } => "E_STREAM_NOT_SSE",
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::ServerClosed => "E_STREAM_CLOSED",
            StreamError::InvalidPayload { .. } => "E_STREAM_PAYLOAD",
            StreamError::RetriesExhausted { .. } => "E_STREAM_RETRIES",
        }
    }
}

impl From<crate::sse::SseParseError> for StreamError {
    fn from(err: crate::sse::SseParseError) -> Self {
        match err {
            crate::sse::SseParseError::InvalidJson { event_type, source } => {
                StreamError::InvalidPayload {
                    event_type,
                    message: source,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(StreamError::ServerClosed.is_retryable());
        assert!(StreamError::ConnectionLost {
            message: "reset".to_string()
        }
        .is_retryable());
        assert!(StreamError::HttpStatus { status: 503 }.is_retryable());
        assert!(!StreamError::HttpStatus { status: 404 }.is_retryable());
        assert!(!StreamError::NotEventStream {
            content_type: "text/html".to_string()
        }
        .is_retryable());
        assert!(!StreamError::InvalidPayload {
            event_type: "message".to_string(),
            message: "eof".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StreamError::HttpStatus { status: 404 }.to_string(),
            "Server returned HTTP 404"
        );
        assert_eq!(
            StreamError::RetriesExhausted { attempts: 3 }.to_string(),
            "Gave up reconnecting after 3 attempts"
        );
    }

    #[test]
    fn test_from_sse_parse_error() {
        let err: StreamError = crate::sse::SseParseError::InvalidJson {
            event_type: "message".to_string(),
            source: "expected value".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "E_STREAM_PAYLOAD");
        assert_eq!(
            err.to_string(),
            "Invalid message payload: expected value"
        );
    }

    #[test]
    fn test_user_messages_not_empty() {
        let errors = [
            StreamError::ConnectionFailed {
                url: "http://localhost:8000/stream".to_string(),
                message: "refused".to_string(),
            },
            StreamError::HttpStatus { status: 500 },
            StreamError::HttpStatus { status: 404 },
            StreamError::ServerClosed,
            StreamError::RetriesExhausted { attempts: 1 },
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }
}
