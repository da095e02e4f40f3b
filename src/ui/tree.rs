//! Tree view.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::helpers::truncate_to_width;
use super::theme::{
    COLOR_ACCENT, COLOR_BORDER, COLOR_DIM, COLOR_SELECTED_BG, COLOR_TREE_COUNT, COLOR_TREE_KEY,
    COLOR_TREE_VALUE,
};
use crate::presenter::{TreePresenter, TreeRow};

const INDENT: &str = "  ";

/// First row to show so the cursor stays on screen.
pub fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 || cursor < height {
        0
    } else {
        cursor + 1 - height
    }
}

/// Marker in front of a row label
fn marker(row: &TreeRow) -> &'static str {
    match (row.expandable, row.collapsed) {
        (true, true) => "▸ ",
        (true, false) => "▾ ",
        (false, _) => "  ",
    }
}

/// Build one line, truncated to `width` columns.
pub fn row_line(row: &TreeRow, width: usize, selected: bool) -> Line<'static> {
    let prefix = format!("{}{}", INDENT.repeat(row.depth), marker(row));
    let label = format!("{}: ", row.label);

    // Board and message rows show a child count rather than a value
    let value_color = if row.depth < 2 {
        COLOR_TREE_COUNT
    } else {
        COLOR_TREE_VALUE
    };

    let fixed = prefix.width() + label.width();
    let spans = if fixed >= width {
        vec![Span::raw(truncate_to_width(&format!("{}{}", prefix, label), width))]
    } else {
        vec![
            Span::raw(prefix).fg(COLOR_DIM),
            Span::raw(label).fg(COLOR_TREE_KEY),
            Span::raw(truncate_to_width(&row.summary, width - fixed)).fg(value_color),
        ]
    };

    let line = Line::from(spans);
    if selected {
        line.style(
            Style::default()
                .bg(COLOR_SELECTED_BG)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        line
    }
}

/// Render the visible window of tree rows.
pub fn render_tree(frame: &mut Frame, area: Rect, tree: &TreePresenter) {
    let title = format!(
        " Signals ({} boards, {} values) ",
        tree.state().board_count(),
        tree.state().leaf_count()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(Line::from(title).fg(COLOR_ACCENT).bold());
    let inner = block.inner(area);

    if tree.rows().is_empty() {
        let placeholder = Paragraph::new(Line::from("Waiting for data...").fg(COLOR_DIM)).block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let height = inner.height as usize;
    let width = inner.width as usize;
    let offset = scroll_offset(tree.cursor(), height);

    let lines: Vec<Line> = tree
        .rows()
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, row)| row_line(row, width, i == tree.cursor()))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(depth: usize, label: &str, summary: &str, expandable: bool, collapsed: bool) -> TreeRow {
        TreeRow {
            path: vec![label.to_string()],
            depth,
            label: label.to_string(),
            summary: summary.to_string(),
            expandable,
            collapsed,
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(5, 0), 0);
    }

    #[test]
    fn test_row_line_markers() {
        assert_eq!(text(&row_line(&row(0, "bms", "2 items", true, false), 80, false)), "▾ bms: 2 items");
        assert_eq!(text(&row_line(&row(0, "bms", "2 items", true, true), 80, false)), "▸ bms: 2 items");
        assert_eq!(text(&row_line(&row(3, "Wh", "450", false, false), 80, false)), "        Wh: 450");
    }

    #[test]
    fn test_row_line_truncates_value() {
        let line = row_line(&row(2, "0", r#"{"module_min_voltage":3.1}"#, true, false), 20, false);
        let rendered = text(&line);
        assert_eq!(rendered.width(), 20);
        assert!(rendered.ends_with('…'));
    }

    #[test]
    fn test_row_line_narrow_width() {
        let line = row_line(&row(4, "battery_voltage", "96", false, false), 6, false);
        assert!(text(&line).width() <= 6);
    }
}
