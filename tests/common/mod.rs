//! Common test utilities for integration tests.
//!
//! Fixtures for telemetry records, SSE bodies and a wiremock-backed
//! stream endpoint.

#![allow(dead_code)]

use candash::models::TelemetryRecord;
use candash::stream::{StreamUpdate, SubscriberConfig};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STREAM_PATH: &str = "/stream";

/// Fixed processing time for deterministic assertions
pub fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// Build a record from a JSON literal
pub fn record(value: Value) -> TelemetryRecord {
    serde_json::from_value(value).expect("test record must be a JSON object")
}

/// One `message` event per payload, optionally with ids
pub fn sse_body(events: &[(Option<&str>, &str)]) -> String {
    let mut body = String::from(": telemetry\n\n");
    for (id, data) in events {
        if let Some(id) = id {
            body.push_str(&format!("id: {}\n", id));
        }
        body.push_str(&format!("data: {}\n\n", data));
    }
    body
}

/// A 200 `text/event-stream` response carrying `body`
pub fn event_stream(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/event-stream")
}

/// Serve `body` at `/stream` for every request
pub async fn mount_stream(server: &MockServer, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .respond_with(event_stream(body))
        .mount(server)
        .await;
}

/// Subscriber config for a mock server with fast retries
pub fn fast_config(server: &MockServer, max_retries: Option<u32>) -> SubscriberConfig {
    SubscriberConfig {
        url: format!("{}{}", server.uri(), STREAM_PATH),
        base_delay: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        max_retries,
        connect_timeout: Duration::from_secs(2),
    }
}

/// Receive updates until `done` matches one, or panic after five seconds.
///
/// Returns everything received, including the matching update.
pub async fn collect_until<F>(
    rx: &mut mpsc::UnboundedReceiver<StreamUpdate>,
    mut done: F,
) -> Vec<StreamUpdate>
where
    F: FnMut(&StreamUpdate) -> bool,
{
    let mut seen = Vec::new();
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(update) = rx.recv().await {
            let finished = done(&update);
            seen.push(update);
            if finished {
                return;
            }
        }
    })
    .await;
    assert!(result.is_ok(), "timed out; received so far: {:#?}", seen);
    seen
}

/// Records in `updates`, in order
pub fn records(updates: &[StreamUpdate]) -> Vec<&TelemetryRecord> {
    updates
        .iter()
        .filter_map(|u| match u {
            StreamUpdate::Record(r) => Some(r),
            _ => None,
        })
        .collect()
}
