//! Color theme constants for the dashboard.

use ratatui::style::Color;

// ============================================================================
// Chrome
// ============================================================================

/// Panel borders
pub const COLOR_BORDER: Color = Color::DarkGray;

/// Titles and highlighted values
pub const COLOR_ACCENT: Color = Color::White;

pub const COLOR_HEADER: Color = Color::White;

/// Dim text for less important info
pub const COLOR_DIM: Color = Color::DarkGray;

/// Selected tree row background
pub const COLOR_SELECTED_BG: Color = Color::Rgb(40, 40, 60);

// ============================================================================
// Connection states
// ============================================================================

pub const COLOR_CONNECTED: Color = Color::LightGreen;

/// Connecting or reconnecting
pub const COLOR_PENDING: Color = Color::Yellow;

/// Disconnected, unavailable, or errors
pub const COLOR_ERROR: Color = Color::Red;

/// Stale stream warning
pub const COLOR_STALE: Color = Color::Rgb(255, 165, 0);

// ============================================================================
// Traces
// ============================================================================

/// Colors assigned to traces in declaration order
pub const TRACE_COLORS: [Color; 4] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::LightGreen,
];

/// Color for the trace at position `i` within its panel
pub fn trace_color(i: usize) -> Color {
    TRACE_COLORS[i % TRACE_COLORS.len()]
}

// ============================================================================
// Tree
// ============================================================================

pub const COLOR_TREE_KEY: Color = Color::Cyan;

pub const COLOR_TREE_VALUE: Color = Color::White;

/// Child counts on board and message rows
pub const COLOR_TREE_COUNT: Color = Color::DarkGray;
