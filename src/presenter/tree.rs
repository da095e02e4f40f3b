//! Tree presenter.
//!
//! Merges every record into an [`AccumulatedState`] and rebuilds the full
//! list of visible rows afterwards. Collapsed nodes are remembered by path
//! so a rebuild keeps the user's layout.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;

use crate::models::TelemetryRecord;
use crate::state::{AccumulatedState, MergePolicy};
use crate::traits::Presenter;

/// Path of a node: board, message, index, then nested keys
pub type NodePath = Vec<String>;

/// One visible line of the tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    pub path: NodePath,
    pub depth: usize,
    pub label: String,
    /// Inline value: compact JSON for values, a child count for groups
    pub summary: String,
    pub expandable: bool,
    pub collapsed: bool,
}

impl TreeRow {
    /// Dotted path, e.g. `A.M.0`
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// Collapsible tree of the latest value per signal.
#[derive(Debug, Clone, Default)]
pub struct TreePresenter {
    state: AccumulatedState,
    rows: Vec<TreeRow>,
    collapsed: HashSet<NodePath>,
    cursor: usize,
    rebuilds: u64,
}

impl TreePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a record, then rebuild every row from the full state.
    ///
    /// Returns whether the record changed anything worth redrawing.
    pub fn apply(&mut self, record: &TelemetryRecord) -> bool {
        let outcome = self.state.merge(record);
        self.rebuild();
        outcome.changed()
    }

    /// Recompute all rows from the accumulated state.
    pub fn rebuild(&mut self) {
        let selected = self.selected_row().map(|row| row.path.clone());

        let mut rows = Vec::new();
        for (board, messages) in self.state.boards() {
            let board_path = vec![board.clone()];
            let collapsed = self.collapsed.contains(&board_path);
            rows.push(TreeRow {
                path: board_path.clone(),
                depth: 0,
                label: board.clone(),
                summary: count_summary(messages.len()),
                expandable: true,
                collapsed,
            });
            if collapsed {
                continue;
            }

            for (message, indices) in messages {
                let message_path = extend(&board_path, message);
                let collapsed = self.collapsed.contains(&message_path);
                rows.push(TreeRow {
                    path: message_path.clone(),
                    depth: 1,
                    label: message.clone(),
                    summary: count_summary(indices.len()),
                    expandable: true,
                    collapsed,
                });
                if collapsed {
                    continue;
                }

                for (index, value) in indices {
                    let index_path = extend(&message_path, &index.to_string());
                    self.push_value(&mut rows, index_path, 2, index.to_string(), value);
                }
            }
        }

        self.rows = rows;
        self.rebuilds += 1;

        // Keep the cursor on the same node when it is still visible
        self.cursor = selected
            .and_then(|path| self.rows.iter().position(|row| row.path == path))
            .unwrap_or(self.cursor)
            .min(self.rows.len().saturating_sub(1));
    }

    /// Push a row for `value` and, when expanded, rows for its children.
    fn push_value(
        &self,
        rows: &mut Vec<TreeRow>,
        path: NodePath,
        depth: usize,
        label: String,
        value: &Value,
    ) {
        let children: Vec<(String, &Value)> = match value {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        };
        let expandable = !children.is_empty();
        let collapsed = expandable && self.collapsed.contains(&path);

        rows.push(TreeRow {
            path: path.clone(),
            depth,
            label,
            summary: compact_json(value),
            expandable,
            collapsed,
        });

        if expandable && !collapsed {
            for (key, child) in children {
                let child_path = extend(&path, &key);
                self.push_value(rows, child_path, depth + 1, key, child);
            }
        }
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn state(&self) -> &AccumulatedState {
        &self.state
    }

    /// Number of full rebuilds so far
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.rows.get(self.cursor)
    }

    /// Row at a dotted path, e.g. `A.M.0`
    pub fn row(&self, dotted: &str) -> Option<&TreeRow> {
        self.rows.iter().find(|row| row.dotted_path() == dotted)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_top(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_bottom(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    /// Collapse or expand the selected node. Returns `false` for leaves.
    pub fn toggle_selected(&mut self) -> bool {
        let Some(row) = self.selected_row() else {
            return false;
        };
        if !row.expandable {
            return false;
        }
        let path = row.path.clone();
        if !self.collapsed.remove(&path) {
            self.collapsed.insert(path);
        }
        self.rebuild();
        true
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
        self.rebuild();
    }

    /// Collapse every board, leaving one row per board.
    pub fn collapse_all(&mut self) {
        self.collapsed = self
            .state
            .boards()
            .map(|(board, _)| vec![board.clone()])
            .collect();
        self.cursor = 0;
        self.rebuild();
    }
}

impl Presenter for TreePresenter {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::OverwriteLeaf
    }

    fn on_record(&mut self, record: &TelemetryRecord, _now: DateTime<Utc>) -> bool {
        self.apply(record)
    }
}

fn extend(path: &[String], key: &str) -> NodePath {
    let mut next = path.to_vec();
    next.push(key.to_string());
    next
}

fn count_summary(n: usize) -> String {
    match n {
        1 => "1 item".to_string(),
        n => format!("{} items", n),
    }
}

/// Single-line JSON rendering of a value
pub fn compact_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}
