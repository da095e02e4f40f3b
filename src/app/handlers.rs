//! Stream update, key and tick handling for App.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use tokio::sync::mpsc;

use super::{App, View};
use crate::error::StreamError;
use crate::stream::{ConnectionState, StreamUpdate};
use crate::traits::Presenter;

/// Most queued updates applied between two draws
pub const MAX_UPDATES_PER_FRAME: usize = 256;

impl App {
    /// Apply up to `limit` queued updates without waiting.
    ///
    /// Returns how many were applied. Anything left stays queued for the
    /// next loop turn.
    pub fn drain_updates(
        &mut self,
        rx: &mut mpsc::UnboundedReceiver<StreamUpdate>,
        limit: usize,
    ) -> usize {
        let mut applied = 0;
        while applied < limit {
            match rx.try_recv() {
                Ok(update) => {
                    self.handle_update(update);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    /// Apply one update from the subscriber.
    pub fn handle_update(&mut self, update: StreamUpdate) {
        self.handle_update_at(update, Utc::now());
    }

    /// Apply one update processed at `now`.
    ///
    /// A record goes to both presenters with the same timestamp, so
    /// switching views always shows current data.
    pub fn handle_update_at(&mut self, update: StreamUpdate, now: DateTime<Utc>) {
        match update {
            StreamUpdate::Record(record) => {
                self.records_received += 1;
                self.last_record_at = Some(now);
                let error_cleared = self.last_error.take().is_some();
                let was_stale = std::mem::replace(&mut self.stale, false);

                let charts_changed = self.charts.on_record(&record, now);
                let tree_changed = self.tree.on_record(&record, now);
                if charts_changed || tree_changed || error_cleared || was_stale {
                    self.mark_dirty();
                }
            }
            StreamUpdate::State(state) => {
                if state != self.connection_state {
                    info!("Connection state: {}", state.label());
                }
                if state == ConnectionState::Connected {
                    self.connected_at = Some(now);
                }
                self.connection_state = state;
                self.mark_dirty();
            }
            StreamUpdate::Error(err) => {
                if matches!(err, StreamError::InvalidPayload { .. }) {
                    self.malformed_count += 1;
                }
                debug!("Stream error shown [{}]: {}", err.error_code(), err);
                self.last_error = Some(err);
                self.mark_dirty();
            }
        }
    }

    /// Periodic housekeeping from the event loop timeout.
    pub fn tick(&mut self) {
        self.tick_at(Utc::now());
    }

    /// Update the stale flag and the displayed record age.
    pub fn tick_at(&mut self, now: DateTime<Utc>) {
        self.tick_count = self.tick_count.wrapping_add(1);

        let stale = self.connection_state == ConnectionState::Connected
            && self
                .last_record_at
                .or(self.connected_at)
                .map(|since| (now - since).to_std().unwrap_or_default() > self.stale_after)
                .unwrap_or(false);
        if stale != self.stale {
            if stale {
                warn!("No telemetry for over {:?}", self.stale_after);
            }
            self.stale = stale;
            self.mark_dirty();
        }

        let age = self.last_record_age(now).map(|age| age.num_seconds());
        if age != self.displayed_age {
            self.displayed_age = age;
            self.mark_dirty();
        }
    }

    /// Handle a key press. Returns `true` when the key was used.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit();
                return true;
            }
            KeyCode::Char('q') => {
                self.quit();
                return true;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.view = self.view.toggle();
                debug!("Switched to {} view", self.view.label());
                self.mark_dirty();
                return true;
            }
            _ => {}
        }

        if self.view != View::Tree {
            return false;
        }

        let handled = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.tree.move_up();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.tree.move_down();
                true
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.tree.move_to_top();
                true
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.tree.move_to_bottom();
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.tree.toggle_selected(),
            KeyCode::Char('e') => {
                self.tree.expand_all();
                true
            }
            KeyCode::Char('c') => {
                self.tree.collapse_all();
                true
            }
            _ => false,
        };
        if handled {
            self.mark_dirty();
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TelemetryRecord;
    use crate::startup::DashConfig;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn record(value: serde_json::Value) -> StreamUpdate {
        StreamUpdate::Record(serde_json::from_value::<TelemetryRecord>(value).unwrap())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_record_feeds_both_presenters() {
        let mut app = App::new(&DashConfig::default());
        app.needs_redraw = false;
        app.handle_update_at(record(json!({"dashboard": {"car_speed": [{"speed": 12.5}]}})), t0());

        assert_eq!(app.records_received, 1);
        assert_eq!(app.last_record_at, Some(t0()));
        assert_eq!(app.charts.panel("car_speed").unwrap().trace("speed").unwrap().len(), 1);
        assert!(app.tree.row("dashboard.car_speed.0.speed").is_some());
        assert!(app.needs_redraw);
    }

    #[test]
    fn test_empty_record_skips_redraw() {
        let mut app = App::new(&DashConfig::default());
        app.needs_redraw = false;
        app.handle_update_at(record(json!({})), t0());

        assert_eq!(app.records_received, 1);
        assert!(!app.needs_redraw);
    }

    #[test]
    fn test_malformed_payload_counted_and_state_unchanged() {
        let mut app = App::new(&DashConfig::default());
        app.handle_update_at(
            StreamUpdate::Error(StreamError::InvalidPayload {
                event_type: "message".to_string(),
                message: "expected value".to_string(),
            }),
            t0(),
        );

        assert_eq!(app.malformed_count, 1);
        assert_eq!(app.records_received, 0);
        assert!(app.tree.state().is_empty());
        assert!(app.last_error.is_some());

        // The next good record clears the error
        app.handle_update_at(record(json!({"a": {"m": [1]}})), t0());
        assert!(app.last_error.is_none());
    }

    #[test]
    fn test_drain_updates_stops_at_limit() {
        let mut app = App::new(&DashConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        for i in 0..300 {
            tx.send(record(json!({"a": {"m": [i]}}))).unwrap();
        }

        assert_eq!(app.drain_updates(&mut rx, MAX_UPDATES_PER_FRAME), 256);
        assert_eq!(app.records_received, 256);

        assert_eq!(app.drain_updates(&mut rx, MAX_UPDATES_PER_FRAME), 44);
        assert_eq!(app.records_received, 300);
        assert_eq!(app.drain_updates(&mut rx, MAX_UPDATES_PER_FRAME), 0);
    }

    #[test]
    fn test_connection_state_update() {
        let mut app = App::new(&DashConfig::default());
        app.handle_update_at(StreamUpdate::State(ConnectionState::Connected), t0());
        assert_eq!(app.connection_state, ConnectionState::Connected);
        assert_eq!(app.connected_at, Some(t0()));
    }

    #[test]
    fn test_stale_after_quiet_period() {
        let mut app = App::new(&DashConfig::default());
        app.handle_update_at(StreamUpdate::State(ConnectionState::Connected), t0());
        app.handle_update_at(record(json!({"a": {"m": [1]}})), t0());

        app.tick_at(t0() + Duration::seconds(4));
        assert!(!app.stale);
        app.tick_at(t0() + Duration::seconds(6));
        assert!(app.stale);

        app.handle_update_at(record(json!({"a": {"m": [2]}})), t0() + Duration::seconds(7));
        assert!(!app.stale);
    }

    #[test]
    fn test_not_stale_while_disconnected() {
        let mut app = App::new(&DashConfig::default());
        app.handle_update_at(StreamUpdate::State(ConnectionState::Unavailable), t0());
        app.tick_at(t0() + Duration::seconds(60));
        assert!(!app.stale);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(&DashConfig::default());
        assert!(app.handle_key(key(KeyCode::Char('q'))));
        assert!(app.should_quit);

        let mut app = App::new(&DashConfig::default());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_switches_view_and_policy() {
        let mut app = App::new(&DashConfig::default());
        assert_eq!(app.active_presenter().name(), "charts");
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view, View::Tree);
        assert_eq!(app.active_presenter().merge_policy().label(), "overwrite-leaf");
    }

    #[test]
    fn test_tree_keys_only_in_tree_view() {
        let mut app = App::new(&DashConfig::default());
        app.handle_update_at(record(json!({"a": {"m": [{"x": 1}]}})), t0());

        assert!(!app.handle_key(key(KeyCode::Down)));
        assert_eq!(app.tree.cursor(), 0);

        app.handle_key(key(KeyCode::Tab));
        assert!(app.handle_key(key(KeyCode::Char('j'))));
        assert_eq!(app.tree.cursor(), 1);
        assert!(app.handle_key(key(KeyCode::Enter)));
        assert!(app.tree.row("a.m").unwrap().collapsed);

        assert!(app.handle_key(key(KeyCode::Char('c'))));
        assert_eq!(app.tree.rows().len(), 1);
        assert!(!app.should_quit);
    }
}
