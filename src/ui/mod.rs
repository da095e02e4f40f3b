//! UI rendering for the dashboard
//!
//! Layout, top to bottom:
//! - Header with the endpoint and view tabs
//! - Body: the 2x2 chart grid or the signal tree
//! - Status line: connection state, counters, staleness, merge policy
//! - Key hints

mod charts;
mod helpers;
mod status_bar;
mod theme;
mod tree;

pub use charts::{padded_bounds, rescale, render_charts, ChartCache};
pub use helpers::{format_age, format_value, truncate_to_width};
pub use status_bar::{key_hints, render_header, render_status_bar, status_spans};
pub use theme::{trace_color, COLOR_ACCENT, COLOR_BORDER, COLOR_DIM, TRACE_COLORS};
pub use tree::{render_tree, row_line, scroll_offset};

use ratatui::{
    layout::{Constraint, Layout},
    style::Stylize,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

// ============================================================================
// Main UI Rendering
// ============================================================================

/// Render the whole dashboard.
pub fn render(frame: &mut Frame, app: &mut App) {
    let [header, body, status, hints] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header, app);

    match app.view {
        View::Charts => render_charts(frame, body, &app.charts, &mut app.chart_cache),
        View::Tree => render_tree(frame, body, &app.tree),
    }

    render_status_bar(frame, status, app);
    frame.render_widget(
        Paragraph::new(Line::from(key_hints(app.view)).fg(COLOR_DIM)),
        hints,
    );
}
