//! Header and status bar.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::helpers::{format_age, truncate_to_width};
use super::theme::{
    COLOR_ACCENT, COLOR_CONNECTED, COLOR_DIM, COLOR_ERROR, COLOR_HEADER, COLOR_PENDING,
    COLOR_STALE,
};
use crate::app::{App, View};
use crate::cli::VERSION;
use crate::stream::ConnectionState;

fn state_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => COLOR_CONNECTED,
        ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => COLOR_PENDING,
        ConnectionState::Disconnected | ConnectionState::Unavailable => COLOR_ERROR,
    }
}

/// Top line: name, endpoint and view tabs.
pub fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let tab = |view: View| {
        let label = format!(" {} ", view.label());
        if app.view == view {
            Span::raw(label).fg(Color::Black).bg(COLOR_ACCENT)
        } else {
            Span::raw(label).fg(COLOR_DIM)
        }
    };

    let line = Line::from(vec![
        Span::raw(format!(" candash {} ", VERSION)).fg(COLOR_HEADER).bold(),
        Span::raw(app.url.clone()).fg(COLOR_DIM),
        Span::raw("  "),
        tab(View::Charts),
        tab(View::Tree),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Status bar spans for `app` at `now`.
pub fn status_spans(app: &App, now: DateTime<Utc>) -> Vec<Span<'static>> {
    let sep = || Span::raw(" │ ").fg(COLOR_DIM);
    let mut spans = vec![
        Span::raw(format!(" ● {}", app.connection_state.label())).fg(state_color(app.connection_state)),
        sep(),
        Span::raw(format!("{} records", app.records_received)),
    ];

    if app.malformed_count > 0 {
        spans.push(sep());
        spans.push(Span::raw(format!("{} malformed", app.malformed_count)).fg(COLOR_ERROR));
    }

    spans.push(sep());
    match app.last_record_age(now) {
        Some(age) => spans.push(Span::raw(format!("last {} ago", format_age(age.num_seconds())))),
        None => spans.push(Span::raw("no data yet").fg(COLOR_DIM)),
    }
    if app.stale {
        spans.push(Span::raw(" STALE").fg(COLOR_STALE).bold());
    }

    let presenter = app.active_presenter();
    spans.push(sep());
    spans.push(Span::raw(format!("{} · {}", presenter.name(), presenter.merge_policy().label())).fg(COLOR_DIM));

    if let View::Charts = app.view {
        spans.push(sep());
        spans.push(Span::raw(app.charts.retention().label()).fg(COLOR_DIM));
    }

    if let Some(err) = &app.last_error {
        spans.push(sep());
        spans.push(Span::raw(err.user_message()).fg(COLOR_ERROR));
    }

    spans
}

/// Status line above the key hints.
pub fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let spans = status_spans(app, Utc::now());
    let text: String = spans.iter().map(|s| s.content.as_ref()).collect();

    // Keep the leading status readable on narrow terminals
    let line = if unicode_width::UnicodeWidthStr::width(text.as_str()) > area.width as usize {
        Line::from(truncate_to_width(&text, area.width as usize))
    } else {
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Key hints for the active view
pub fn key_hints(view: View) -> &'static str {
    match view {
        View::Charts => " q quit · Tab tree view",
        View::Tree => " q quit · Tab charts · ↑↓ move · Enter toggle · e expand all · c collapse all",
    }
}
