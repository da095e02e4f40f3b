//! HTTP client for the telemetry event stream.
//!
//! Opens `GET <url>` with `Accept: text/event-stream` and turns the response
//! body into a stream of parsed frames.

use bytes::Bytes;
use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Client;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

use crate::error::{StreamError, StreamResult};
use crate::sse::{SseEvent, SseParser};

/// Header carrying the id of the last event seen before a reconnect
pub const LAST_EVENT_ID_HEADER: &str = "Last-Event-ID";

const EVENT_STREAM_MIME: &str = "text/event-stream";

/// One dispatched event plus the parser state that came with it
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFrame {
    pub event: SseEvent,
    /// Last event id seen on this connection, if any
    pub last_event_id: Option<String>,
    /// Reconnection delay advertised by the server, if any
    pub retry: Option<Duration>,
}

/// Boxed stream of frames from one connection
pub type FrameStream = Pin<Box<dyn Stream<Item = StreamResult<StreamFrame>> + Send>>;

/// Client for one telemetry stream endpoint.
#[derive(Debug, Clone)]
pub struct StreamClient {
    url: String,
    client: Client,
}

impl StreamClient {
    /// Create a client for `url` with the given connect timeout.
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> StreamResult<Self> {
        let url = url.into();
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| StreamError::ConnectionFailed {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the stream.
    ///
    /// Fails with [`StreamError::HttpStatus`] on a non-success status and
    /// [`StreamError::NotEventStream`] when the response is not
    /// `text/event-stream`.
    pub async fn open(&self, last_event_id: Option<&str>) -> StreamResult<FrameStream> {
        let mut request = self
            .client
            .get(&self.url)
            .header(ACCEPT, EVENT_STREAM_MIME)
            .header(CACHE_CONTROL, "no-cache");
        if let Some(id) = last_event_id {
            request = request.header(LAST_EVENT_ID_HEADER, id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StreamError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_event_stream(&content_type) {
            return Err(StreamError::NotEventStream {
                content_type: if content_type.is_empty() {
                    "none".to_string()
                } else {
                    content_type
                },
            });
        }

        debug!("Stream opened at {}", self.url);
        Ok(frames(response.bytes_stream()))
    }
}

/// Check a `Content-Type` value, ignoring parameters and case.
pub fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case(EVENT_STREAM_MIME))
        .unwrap_or(false)
}

/// Read state carried between frames of one connection
struct FrameReader<S> {
    bytes: Pin<Box<S>>,
    parser: SseParser,
    buffer: Vec<u8>,
    /// The body has ended; a trailing `\r` now terminates its line
    eof: bool,
    done: bool,
}

/// Turn a body byte stream into parsed frames.
///
/// Bytes are buffered until a full line is available, so multi-byte
/// characters and lines split across chunks decode correctly. Lines end in
/// `\n`, `\r\n` or a lone `\r`.
pub fn frames<S>(bytes_stream: S) -> FrameStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let reader = FrameReader {
        bytes: Box::pin(bytes_stream),
        parser: SseParser::new(),
        buffer: Vec::new(),
        eof: false,
        done: false,
    };

    let frame_stream = stream::unfold(reader, |mut reader| async move {
        loop {
            if reader.done {
                return None;
            }

            // Drain complete lines first
            if let Some(raw) = take_line(&mut reader.buffer, reader.eof) {
                let line = String::from_utf8_lossy(&raw).into_owned();
                match reader.parser.feed_line(&line) {
                    Ok(Some(event)) => {
                        let frame = StreamFrame {
                            event,
                            last_event_id: reader.parser.last_event_id().map(str::to_string),
                            retry: reader.parser.retry(),
                        };
                        return Some((Ok(frame), reader));
                    }
                    Ok(None) => continue,
                    Err(e) => return Some((Err(StreamError::from(e)), reader)),
                }
            }

            if reader.eof {
                // A trailing partial event without a blank line is not dispatched
                reader.done = true;
                return Some((Err(StreamError::ServerClosed), reader));
            }

            match reader.bytes.next().await {
                Some(Ok(chunk)) => reader.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    reader.done = true;
                    return Some((
                        Err(StreamError::ConnectionLost {
                            message: e.to_string(),
                        }),
                        reader,
                    ));
                }
                None => reader.eof = true,
            }
        }
    });

    Box::pin(frame_stream)
}

/// Remove the first complete line from `buffer`, without its terminator.
///
/// A `\r` at the very end of the buffer may be the first half of `\r\n`,
/// so it only ends a line once the body is over.
fn take_line(buffer: &mut Vec<u8>, eof: bool) -> Option<Vec<u8>> {
    let pos = buffer.iter().position(|b| *b == b'\n' || *b == b'\r')?;
    let terminator_len = match (buffer[pos], buffer.get(pos + 1).copied()) {
        (b'\r', Some(b'\n')) => 2,
        (b'\r', None) if !eof => return None,
        _ => 1,
    };
    let line = buffer[..pos].to_vec();
    buffer.drain(..pos + terminator_len);
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: &[&str]) -> FrameStream {
        let items: Vec<reqwest::Result<Bytes>> = parts
            .iter()
            .map(|p| Ok(Bytes::from(p.as_bytes().to_vec())))
            .collect();
        frames(stream::iter(items))
    }

    #[test]
    fn test_is_event_stream() {
        assert!(is_event_stream("text/event-stream"));
        assert!(is_event_stream("text/event-stream; charset=utf-8"));
        assert!(is_event_stream("Text/Event-Stream"));
        assert!(!is_event_stream("text/plain"));
        assert!(!is_event_stream(""));
    }

    #[tokio::test]
    async fn test_frames_across_chunk_boundaries() {
        let mut s = chunks(&[
            "id: 1\ndata: {\"bms\":",
            " {\"bms_capacity\": [{\"Wh\": 4",
            "50}]}}\r\n\r\n",
        ]);

        let frame = s.next().await.unwrap().unwrap();
        assert_eq!(frame.last_event_id.as_deref(), Some("1"));
        match frame.event {
            SseEvent::Record(record) => {
                let sub = record.lookup("bms", "bms_capacity", 0).unwrap();
                assert_eq!(sub["Wh"], 450);
            }
            other => panic!("Expected record, got {:?}", other),
        }

        assert!(matches!(s.next().await, Some(Err(StreamError::ServerClosed))));
        assert!(s.next().await.is_none());
    }

    #[test]
    fn test_take_line_terminators() {
        let mut buffer = b"a\nb\r\nc\rd".to_vec();
        assert_eq!(take_line(&mut buffer, false), Some(b"a".to_vec()));
        assert_eq!(take_line(&mut buffer, false), Some(b"b".to_vec()));
        assert_eq!(take_line(&mut buffer, false), Some(b"c".to_vec()));
        assert_eq!(take_line(&mut buffer, false), None);
        assert_eq!(buffer, b"d".to_vec());
    }

    #[test]
    fn test_take_line_waits_on_trailing_carriage_return() {
        let mut buffer = b"data: x\r".to_vec();
        assert_eq!(take_line(&mut buffer, false), None);
        assert_eq!(take_line(&mut buffer, true), Some(b"data: x".to_vec()));
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_lone_carriage_return_line_endings() {
        let mut s = chunks(&["id: 3\rdata: {\"a\": {\"m\": [1]}}\r\r"]);

        let frame = s.next().await.unwrap().unwrap();
        assert_eq!(frame.last_event_id.as_deref(), Some("3"));
        assert!(matches!(frame.event, SseEvent::Record(_)));
        assert!(matches!(s.next().await, Some(Err(StreamError::ServerClosed))));
    }

    #[tokio::test]
    async fn test_crlf_split_across_chunks_is_one_terminator() {
        let mut s = chunks(&[
            "data: {\"a\": {\"m\": [1]}}\r",
            "\n\r",
            "\ndata: {\"b\": {\"m\": [2]}}\r\n\r\n",
        ]);

        for board in ["a", "b"] {
            match s.next().await.unwrap().unwrap().event {
                SseEvent::Record(record) => assert!(record.as_map().contains_key(board)),
                other => panic!("Expected record, got {:?}", other),
            }
        }
        assert!(matches!(s.next().await, Some(Err(StreamError::ServerClosed))));
    }

    #[tokio::test]
    async fn test_split_utf8_character() {
        let body = "data: {\"a\": {\"m\": [{\"label\": \"é\"}]}}\n\n".as_bytes();
        let split = body.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let items: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::copy_from_slice(&body[..split])),
            Ok(Bytes::copy_from_slice(&body[split..])),
        ];
        let mut s = frames(stream::iter(items));

        match s.next().await.unwrap().unwrap().event {
            SseEvent::Record(record) => {
                assert_eq!(record.lookup("a", "m", 0).unwrap()["label"], "é");
            }
            other => panic!("Expected record, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_does_not_end_stream() {
        let mut s = chunks(&["data: not json\n\n", "retry: 250\ndata: {\"b\": {}}\n\n"]);

        assert!(matches!(
            s.next().await,
            Some(Err(StreamError::InvalidPayload { .. }))
        ));
        let frame = s.next().await.unwrap().unwrap();
        assert_eq!(frame.retry, Some(Duration::from_millis(250)));
        assert!(matches!(frame.event, SseEvent::Record(_)));
    }

    #[tokio::test]
    async fn test_trailing_partial_event_is_dropped() {
        let mut s = chunks(&["data: {\"a\": {}}"]);
        assert!(matches!(s.next().await, Some(Err(StreamError::ServerClosed))));
        assert!(s.next().await.is_none());
    }
}
