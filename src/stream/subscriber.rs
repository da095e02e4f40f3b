//! Stream subscriber.
//!
//! Runs the connection loop in a background task: connect, forward every
//! decoded record, and reconnect with exponential backoff when the stream
//! drops. Connection state goes out on the update channel so the UI sees it
//! in order with the records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::StreamError;
use crate::models::TelemetryRecord;
use crate::sse::SseEvent;
use crate::stream::client::StreamClient;

/// Stream connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// First connection attempt in progress
    Connecting,
    Connected,
    /// Waiting before reconnection attempt `attempt`
    Reconnecting { attempt: u32 },
    /// Gave up reconnecting, or shut down
    Disconnected,
    /// Endpoint answered but cannot serve an event stream
    Unavailable,
}

impl ConnectionState {
    pub fn label(&self) -> String {
        match self {
            ConnectionState::Connecting => "connecting".to_string(),
            ConnectionState::Connected => "connected".to_string(),
            ConnectionState::Reconnecting { attempt } => format!("reconnecting ({})", attempt),
            ConnectionState::Disconnected => "disconnected".to_string(),
            ConnectionState::Unavailable => "unavailable".to_string(),
        }
    }

    /// Whether the subscriber has stopped for good
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConnectionState::Disconnected | ConnectionState::Unavailable
        )
    }
}

/// Updates delivered to the UI, in stream order
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Record(TelemetryRecord),
    State(ConnectionState),
    /// A non-fatal problem worth showing, e.g. a skipped payload
    Error(StreamError),
}

/// Configuration for the subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub url: String,
    /// First reconnect delay; replaced by the server's `retry:` hint,
    /// floored at [`MIN_RETRY_DELAY`]
    pub base_delay: Duration,
    pub max_backoff: Duration,
    /// `None` retries forever
    pub max_retries: Option<u32>,
    pub connect_timeout: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            url: crate::startup::DEFAULT_STREAM_URL.to_string(),
            base_delay: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            max_retries: None,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Lowest reconnect delay a server `retry:` hint can set
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Delay before reconnection attempt `attempt` (1-based):
/// base, 2x base, 4x base, ... capped at `max`.
pub fn backoff_delay(base: Duration, attempt: u32, max: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exponent).min(max)
}

/// Handle to a running subscriber task.
///
/// Dropping the handle stops the task.
pub struct Subscriber {
    shutdown: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Subscriber {
    /// Spawn the connection loop, sending updates to `updates`.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn spawn(
        config: SubscriberConfig,
        updates: mpsc::UnboundedSender<StreamUpdate>,
    ) -> Result<Self, StreamError> {
        let client = StreamClient::new(config.url.clone(), config.connect_timeout)?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let task = tokio::spawn(async move {
            run_subscriber(client, config, updates, shutdown_clone).await;
        });

        Ok(Self { shutdown, task })
    }

    /// Stop the task. Safe to call more than once.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            debug!("Stream subscriber shutting down");
        }
        self.task.abort();
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Shared publishing for state changes
struct Publisher {
    updates: mpsc::UnboundedSender<StreamUpdate>,
}

impl Publisher {
    /// Returns `false` once the receiving side is gone.
    fn state(&self, state: ConnectionState) -> bool {
        self.updates.send(StreamUpdate::State(state)).is_ok()
    }

    fn send(&self, update: StreamUpdate) -> bool {
        self.updates.send(update).is_ok()
    }
}

/// How one connection ended
enum ConnectionEnd {
    /// Retryable failure; try again after backoff
    Retry(StreamError),
    /// Unretryable failure
    Fatal(StreamError),
    /// Shutdown requested or receiver dropped
    Stop,
}

async fn run_subscriber(
    client: StreamClient,
    config: SubscriberConfig,
    updates: mpsc::UnboundedSender<StreamUpdate>,
    shutdown: Arc<AtomicBool>,
) {
    let publisher = Publisher { updates };
    let mut last_event_id: Option<String> = None;
    let mut base_delay = config.base_delay;
    let mut attempt: u32 = 0;

    info!("Subscribing to {}", client.url());

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        let end = run_connection(
            &client,
            &publisher,
            &shutdown,
            &mut last_event_id,
            &mut base_delay,
            &mut attempt,
        )
        .await;

        let err = match end {
            ConnectionEnd::Stop => break,
            ConnectionEnd::Fatal(err) => {
                error!("Stream unavailable [{}]: {}", err.error_code(), err);
                publisher.send(StreamUpdate::Error(err));
                publisher.state(ConnectionState::Unavailable);
                return;
            }
            ConnectionEnd::Retry(err) => err,
        };

        attempt += 1;
        if let Some(max) = config.max_retries {
            if attempt > max {
                error!("Failed to reconnect after {} attempts, giving up", max);
                publisher.send(StreamUpdate::Error(err));
                publisher.send(StreamUpdate::Error(StreamError::RetriesExhausted {
                    attempts: max,
                }));
                publisher.state(ConnectionState::Disconnected);
                return;
            }
        }

        let delay = backoff_delay(base_delay, attempt, config.max_backoff);
        warn!(
            "Stream error [{}]: {}; reconnect attempt {} in {:?}",
            err.error_code(),
            err,
            attempt,
            delay
        );
        if !publisher.send(StreamUpdate::Error(err))
            || !publisher.state(ConnectionState::Reconnecting { attempt })
        {
            break;
        }

        tokio::time::sleep(delay).await;
    }

    debug!("Stream subscriber stopped");
}

/// Open one connection and forward its records until it ends.
async fn run_connection(
    client: &StreamClient,
    publisher: &Publisher,
    shutdown: &AtomicBool,
    last_event_id: &mut Option<String>,
    base_delay: &mut Duration,
    attempt: &mut u32,
) -> ConnectionEnd {
    if *attempt == 0 && !publisher.state(ConnectionState::Connecting) {
        return ConnectionEnd::Stop;
    }

    let mut frames = match client.open(last_event_id.as_deref()).await {
        Ok(frames) => frames,
        Err(err) => return end_for(err),
    };

    if *attempt > 0 {
        info!("Reconnected on attempt {}", attempt);
    } else {
        info!("Connected to {}", client.url());
    }
    if !publisher.state(ConnectionState::Connected) {
        return ConnectionEnd::Stop;
    }

    while let Some(item) = frames.next().await {
        if shutdown.load(Ordering::SeqCst) {
            return ConnectionEnd::Stop;
        }

        match item {
            Ok(frame) => {
                // Only a delivered frame counts as a successful reconnect
                *attempt = 0;
                if frame.last_event_id.is_some() {
                    *last_event_id = frame.last_event_id;
                }
                if let Some(retry) = frame.retry {
                    *base_delay = retry.max(MIN_RETRY_DELAY);
                }
                match frame.event {
                    SseEvent::Record(record) => {
                        if !publisher.send(StreamUpdate::Record(record)) {
                            return ConnectionEnd::Stop;
                        }
                    }
                    SseEvent::Other { event_type, .. } => {
                        debug!("Ignoring '{}' event", event_type);
                    }
                }
            }
            Err(err @ StreamError::InvalidPayload { .. }) => {
                warn!("Skipping malformed payload: {}", err);
                if !publisher.send(StreamUpdate::Error(err)) {
                    return ConnectionEnd::Stop;
                }
            }
            Err(err) => return end_for(err),
        }
    }

    ConnectionEnd::Retry(StreamError::ServerClosed)
}

fn end_for(err: StreamError) -> ConnectionEnd {
    if err.is_retryable() {
        ConnectionEnd::Retry(err)
    } else {
        ConnectionEnd::Fatal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(4);
        let delays: Vec<u64> = (1..=5)
            .map(|a| backoff_delay(base, a, max).as_secs())
            .collect();
        assert_eq!(delays, vec![1, 2, 4, 4, 4]);
    }

    #[test]
    fn test_backoff_from_retry_hint() {
        let delay = backoff_delay(Duration::from_millis(250), 3, Duration::from_secs(30));
        assert_eq!(delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_large_attempt_does_not_overflow() {
        let max = Duration::from_secs(30);
        assert_eq!(backoff_delay(Duration::from_secs(1), u32::MAX, max), max);
    }

    #[test]
    fn test_only_retryable_errors_reconnect() {
        assert!(matches!(
            end_for(StreamError::HttpStatus { status: 502 }),
            ConnectionEnd::Retry(_)
        ));
        assert!(matches!(end_for(StreamError::ServerClosed), ConnectionEnd::Retry(_)));
        assert!(matches!(
            end_for(StreamError::HttpStatus { status: 404 }),
            ConnectionEnd::Fatal(_)
        ));
        assert!(matches!(
            end_for(StreamError::NotEventStream {
                content_type: "text/html".to_string()
            }),
            ConnectionEnd::Fatal(_)
        ));
    }

    #[test]
    fn test_connection_state_labels() {
        assert_eq!(ConnectionState::Connected.label(), "connected");
        assert_eq!(
            ConnectionState::Reconnecting { attempt: 3 }.label(),
            "reconnecting (3)"
        );
        assert!(ConnectionState::Unavailable.is_terminal());
        assert!(!ConnectionState::Connecting.is_terminal());
    }
}
