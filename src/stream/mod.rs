//! Stream subscriber
//!
//! - `client` - opens the event stream and parses it into frames
//! - `subscriber` - background connection loop with reconnect and backoff

pub mod client;
pub mod subscriber;

pub use client::{is_event_stream, FrameStream, StreamClient, StreamFrame, LAST_EVENT_ID_HEADER};
pub use subscriber::{
    backoff_delay, ConnectionState, StreamUpdate, Subscriber, SubscriberConfig, MIN_RETRY_DELAY,
};
