//! Application state.
//!
//! [`App`] owns both presenters and everything the status bar shows. It is
//! only touched from the UI task, one update or key event at a time.

mod handlers;
mod types;

pub use handlers::MAX_UPDATES_PER_FRAME;
pub use types::View;

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::presenter::{ChartPresenter, TreePresenter};
use crate::startup::DashConfig;
use crate::stream::{ConnectionState, StreamUpdate};
use crate::traits::Presenter;
use crate::ui::ChartCache;

/// Main application state
pub struct App {
    /// View shown on screen
    pub view: View,
    pub charts: ChartPresenter,
    pub tree: TreePresenter,
    /// Render-side copy of the chart series
    pub chart_cache: ChartCache,

    // ========================================================================
    // Stream status
    // ========================================================================
    /// Endpoint shown in the header
    pub url: String,
    pub connection_state: ConnectionState,
    /// When the current connection was established
    pub connected_at: Option<DateTime<Utc>>,
    /// Most recent stream error, cleared on the next record
    pub last_error: Option<StreamError>,
    pub records_received: u64,
    /// Payloads skipped because they did not decode
    pub malformed_count: u64,
    pub last_record_at: Option<DateTime<Utc>>,
    /// No record for this long marks the stream stale
    pub stale_after: Duration,
    pub stale: bool,

    // ========================================================================
    // Loop control
    // ========================================================================
    /// Whether the UI needs to be redrawn
    pub needs_redraw: bool,
    pub should_quit: bool,
    /// Tick counter, bumped every loop timeout
    pub tick_count: u64,
    /// Whole seconds since the last record as last drawn
    displayed_age: Option<i64>,

    /// Sender handed to the subscriber
    pub message_tx: mpsc::UnboundedSender<StreamUpdate>,
    /// Receiver taken by the event loop
    pub message_rx: Option<mpsc::UnboundedReceiver<StreamUpdate>>,
}

impl App {
    /// Create the application state for `config`.
    pub fn new(config: &DashConfig) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        Self {
            view: config.view,
            charts: ChartPresenter::new(config.retention),
            tree: TreePresenter::new(),
            chart_cache: ChartCache::default(),
            url: config.url.clone(),
            connection_state: ConnectionState::Connecting,
            connected_at: None,
            last_error: None,
            records_received: 0,
            malformed_count: 0,
            last_record_at: None,
            stale_after: config.stale_after,
            stale: false,
            needs_redraw: true,
            should_quit: false,
            tick_count: 0,
            displayed_age: None,
            message_tx,
            message_rx: Some(message_rx),
        }
    }

    /// Mark the UI as needing a redraw
    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Presenter behind the current view
    pub fn active_presenter(&self) -> &dyn Presenter {
        match self.view {
            View::Charts => &self.charts,
            View::Tree => &self.tree,
        }
    }

    /// Time since the last record, if one has arrived
    pub fn last_record_age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.last_record_at.map(|at| now - at)
    }
}
