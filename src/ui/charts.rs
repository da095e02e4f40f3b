//! Chart view.
//!
//! Four panels in a 2x2 grid. [`ChartCache`] keeps a render-side copy of
//! every series as `(seconds, value)` pairs and only touches panels whose
//! revision moved since the last frame.

use std::collections::VecDeque;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use super::helpers::format_value;
use super::theme::{trace_color, COLOR_ACCENT, COLOR_BORDER, COLOR_DIM};
use crate::presenter::{AxisSide, ChartPanel, ChartPresenter};

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug, Clone, Default)]
struct TraceCache {
    /// Series `appended` counter at the last sync
    appended: u64,
    points: VecDeque<(f64, f64)>,
}

#[derive(Debug, Clone, Default)]
struct PanelCache {
    revision: u64,
    traces: Vec<TraceCache>,
}

/// Render-side copy of the chart series.
#[derive(Debug, Clone, Default)]
pub struct ChartCache {
    panels: Vec<PanelCache>,
    /// Panel refreshes performed, for tests and benchmarks
    refreshes: u64,
}

impl ChartCache {
    /// Bring the cache up to date. Returns how many panels were refreshed.
    pub fn sync(&mut self, charts: &ChartPresenter) -> usize {
        if self.panels.len() != charts.panels().len() {
            self.panels = charts
                .panels()
                .iter()
                .map(|panel| PanelCache {
                    revision: 0,
                    traces: vec![TraceCache::default(); panel.traces().len()],
                })
                .collect();
        }

        let mut refreshed = 0;
        for (cache, panel) in self.panels.iter_mut().zip(charts.panels()) {
            if cache.revision == panel.revision() {
                continue;
            }

            for (trace, series) in cache.traces.iter_mut().zip(panel.traces()) {
                let new = (series.appended() - trace.appended) as usize;
                if new >= series.len() {
                    // Fell behind by more than the retained window
                    trace.points = series
                        .points()
                        .map(|p| (charts.seconds_since_origin(p.at), p.value))
                        .collect();
                } else {
                    trace.points.extend(
                        series
                            .tail(new)
                            .map(|p| (charts.seconds_since_origin(p.at), p.value)),
                    );
                    while trace.points.len() > series.len() {
                        trace.points.pop_front();
                    }
                }
                trace.appended = series.appended();
            }

            cache.revision = panel.revision();
            refreshed += 1;
        }

        self.refreshes += refreshed as u64;
        refreshed
    }

    /// Total panel refreshes so far
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Cached points of one trace
    pub fn points(&self, panel: usize, trace: usize) -> Vec<(f64, f64)> {
        self.panels
            .get(panel)
            .and_then(|p| p.traces.get(trace))
            .map(|t| t.points.iter().copied().collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Scaling
// ============================================================================

/// Map `value` linearly from the `from` range onto the `to` range.
///
/// A degenerate `from` range maps to the middle of `to`.
pub fn rescale(value: f64, from: [f64; 2], to: [f64; 2]) -> f64 {
    let span = from[1] - from[0];
    if span.abs() < f64::EPSILON {
        return (to[0] + to[1]) / 2.0;
    }
    to[0] + (value - from[0]) * (to[1] - to[0]) / span
}

/// Axis bounds around a value range with a little headroom.
pub fn padded_bounds(range: Option<(f64, f64)>) -> [f64; 2] {
    match range {
        None => [0.0, 1.0],
        Some((min, max)) if (max - min).abs() < f64::EPSILON => [min - 1.0, max + 1.0],
        Some((min, max)) => {
            let pad = (max - min) * 0.05;
            [min - pad, max + pad]
        }
    }
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Line<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| Line::from(format_value(*v)))
        .collect()
}

// ============================================================================
// Rendering
// ============================================================================

/// Render the 2x2 grid of panels.
pub fn render_charts(frame: &mut Frame, area: Rect, charts: &ChartPresenter, cache: &mut ChartCache) {
    cache.sync(charts);

    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    let mut cells = Vec::with_capacity(4);
    for row in rows.iter() {
        let cols =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(*row);
        cells.extend(cols.iter().copied());
    }

    for (i, (panel, cell)) in charts.panels().iter().zip(cells).enumerate() {
        if let Some(panel_cache) = cache.panels.get_mut(i) {
            render_panel(frame, cell, panel, panel_cache);
        }
    }
}

fn render_panel(frame: &mut Frame, area: Rect, panel: &ChartPanel, cache: &mut PanelCache) {
    let spec = panel.spec();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(Line::from(format!(" {} ", spec.title)).fg(COLOR_ACCENT).bold())
        .title_bottom(Line::from(format!(" {} ", spec.source_path())).fg(COLOR_DIM));

    if cache.traces.iter().all(|t| t.points.is_empty()) {
        let placeholder = Paragraph::new(Line::from("Waiting for data...").fg(COLOR_DIM))
            .centered()
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    for trace in cache.traces.iter_mut() {
        trace.points.make_contiguous();
    }

    let sides: Vec<AxisSide> = spec.traces.iter().map(|t| t.axis).collect();
    // The cache mirrors the series after sync, so ranges come from the series
    let range_for = |side: AxisSide| {
        panel
            .traces()
            .iter()
            .zip(&sides)
            .filter(|(_, s)| **s == side)
            .filter_map(|(series, _)| series.value_range())
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    };
    let left_range = range_for(AxisSide::Left);
    let right_range = range_for(AxisSide::Right);
    let right_bounds = padded_bounds(right_range);
    // With no left-axis data the right-axis traces own the chart
    let left_bounds = padded_bounds(left_range.or(right_range));

    let x_min = cache
        .traces
        .iter()
        .filter_map(|t| t.points.front().map(|p| p.0))
        .fold(f64::INFINITY, f64::min);
    let x_max = cache
        .traces
        .iter()
        .filter_map(|t| t.points.back().map(|p| p.0))
        .fold(f64::NEG_INFINITY, f64::max);
    let x_bounds = [x_min, x_max.max(x_min + 1.0)];

    // Right-axis traces are drawn against the left axis after rescaling
    let rescaled: Vec<Option<Vec<(f64, f64)>>> = cache
        .traces
        .iter()
        .zip(&sides)
        .map(|(t, side)| match side {
            AxisSide::Right if left_range.is_some() => Some(
                t.points
                    .iter()
                    .map(|(x, y)| (*x, rescale(*y, right_bounds, left_bounds)))
                    .collect(),
            ),
            _ => None,
        })
        .collect();

    let datasets: Vec<Dataset> = spec
        .traces
        .iter()
        .enumerate()
        .filter_map(|(i, trace_spec)| {
            let cached = &cache.traces[i];
            let latest = cached.points.back()?.1;
            let data: &[(f64, f64)] = match &rescaled[i] {
                Some(points) => points.as_slice(),
                None => cached.points.as_slices().0,
            };
            let suffix = if trace_spec.axis == AxisSide::Right { " [R]" } else { "" };
            Some(
                Dataset::default()
                    .name(format!("{}{} {}", trace_spec.label, suffix, format_value(latest)))
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(trace_color(i)))
                    .data(data),
            )
        })
        .collect();

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let show_gutter = spec.has_secondary_axis() && right_range.is_some() && left_range.is_some();
    let (chart_area, gutter_area) = if show_gutter {
        let labels = axis_labels(right_bounds);
        let width = labels.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 1;
        let split = Layout::horizontal([Constraint::Min(0), Constraint::Length(width)]).split(inner);
        (split[0], Some((split[1], labels)))
    } else {
        (inner, None)
    };

    let chart = Chart::new(datasets)
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Percentage(90), Constraint::Percentage(60)))
        .x_axis(
            Axis::default()
                .title(Span::from("s").fg(COLOR_DIM))
                .style(Style::default().fg(COLOR_DIM))
                .bounds(x_bounds)
                .labels(vec![
                    Line::from(format!("{:.0}", x_bounds[0])),
                    Line::from(format!("{:.0}", x_bounds[1])),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(COLOR_DIM))
                .bounds(left_bounds)
                .labels(axis_labels(left_bounds)),
        );
    frame.render_widget(chart, chart_area);

    if let Some((gutter, labels)) = gutter_area {
        render_right_axis(frame, gutter, labels);
    }
}

/// Right-axis labels, top to bottom, leaving room for the x axis.
fn render_right_axis(frame: &mut Frame, area: Rect, labels: Vec<Line<'static>>) {
    if area.height < 3 {
        return;
    }
    // Bottom two rows belong to the x axis line and its labels
    let usable = area.height.saturating_sub(2).max(1);
    let mut lines = vec![Line::default(); usable as usize];
    let last = lines.len() - 1;
    let positions = [last, last / 2, 0];
    for (pos, label) in positions.iter().zip(labels) {
        lines[*pos] = label.fg(COLOR_DIM);
    }
    frame.render_widget(Paragraph::new(lines).right_aligned(), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TelemetryRecord;
    use crate::presenter::PANELS;
    use crate::state::RetentionPolicy;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn speed(v: f64) -> TelemetryRecord {
        serde_json::from_value(json!({"dashboard": {"car_speed": [{"speed": v}]}})).unwrap()
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(20.0, [20.0, 40.0], [3.0, 4.0]), 3.0);
        assert_eq!(rescale(40.0, [20.0, 40.0], [3.0, 4.0]), 4.0);
        assert_eq!(rescale(30.0, [20.0, 40.0], [3.0, 4.0]), 3.5);
        assert_eq!(rescale(7.0, [7.0, 7.0], [0.0, 10.0]), 5.0);
    }

    #[test]
    fn test_padded_bounds() {
        assert_eq!(padded_bounds(None), [0.0, 1.0]);
        assert_eq!(padded_bounds(Some((5.0, 5.0))), [4.0, 6.0]);
        assert_eq!(padded_bounds(Some((0.0, 100.0))), [-5.0, 105.0]);
    }

    #[test]
    fn test_cache_refreshes_only_changed_panels() {
        let mut charts = ChartPresenter::with_panels(&PANELS, RetentionPolicy::Unbounded, t0());
        let mut cache = ChartCache::default();
        assert_eq!(cache.sync(&charts), 0);

        charts.apply(&speed(1.0), t0() + Duration::seconds(1));
        assert_eq!(cache.sync(&charts), 1);
        assert_eq!(cache.sync(&charts), 0);

        charts.apply(&speed(2.0), t0() + Duration::seconds(2));
        assert_eq!(cache.sync(&charts), 1);
        assert_eq!(cache.points(0, 0), vec![(1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(cache.refreshes(), 2);
    }

    #[test]
    fn test_cache_follows_retention() {
        let mut charts = ChartPresenter::with_panels(&PANELS, RetentionPolicy::MaxPoints(3), t0());
        let mut cache = ChartCache::default();

        for i in 0..4 {
            charts.apply(&speed(i as f64), t0() + Duration::seconds(i));
            cache.sync(&charts);
        }
        assert_eq!(cache.points(0, 0), vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);

        // Skip several frames, falling behind the retained window
        for i in 4..10 {
            charts.apply(&speed(i as f64), t0() + Duration::seconds(i));
        }
        cache.sync(&charts);
        assert_eq!(cache.points(0, 0), vec![(7.0, 7.0), (8.0, 8.0), (9.0, 9.0)]);
    }

    #[test]
    fn test_render_placeholder_and_titles() {
        let charts = ChartPresenter::with_panels(&PANELS, RetentionPolicy::default(), t0());
        let mut cache = ChartCache::default();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        terminal
            .draw(|f| render_charts(f, f.area(), &charts, &mut cache))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Speed"));
        assert!(text.contains("BMS Capacity"));
        assert!(text.contains("Waiting for data..."));
    }

    #[test]
    fn test_axis_bounds_follow_series_range() {
        let mut charts = ChartPresenter::with_panels(&PANELS, RetentionPolicy::default(), t0());
        charts.apply(&speed(10.0), t0() + Duration::seconds(1));
        charts.apply(&speed(110.0), t0() + Duration::seconds(2));
        let mut cache = ChartCache::default();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        terminal
            .draw(|f| render_charts(f, f.area(), &charts, &mut cache))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        // 10..110 padded by 5% on each side
        assert!(text.contains("115"));
        assert!(text.contains("60"));
    }

    #[test]
    fn test_render_with_secondary_axis_does_not_panic() {
        let mut charts = ChartPresenter::with_panels(&PANELS, RetentionPolicy::default(), t0());
        for i in 0..5 {
            let record: TelemetryRecord = serde_json::from_value(json!({"bms": {"bms_module_min_max": [{
                "module_min_voltage": 3.0 + i as f64 * 0.1,
                "module_max_voltage": 4.0,
                "module_min_temp": 20 + i,
                "module_max_temp": 30 + i
            }]}}))
            .unwrap();
            charts.apply(&record, t0() + Duration::seconds(i));
        }
        let mut cache = ChartCache::default();
        for (w, h) in [(120, 30), (60, 16)] {
            let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
            terminal
                .draw(|f| render_charts(f, f.area(), &charts, &mut cache))
                .unwrap();
        }
    }
}
