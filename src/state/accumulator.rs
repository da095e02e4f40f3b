//! Accumulated telemetry state for the tree view.
//!
//! Holds the union of every record seen so far, three levels deep:
//! board, message, index. The value stored at an index is whatever the last
//! record carried there.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{index_entries, IndexKey, TelemetryRecord};

/// Index level of one message
pub type IndexMap = BTreeMap<IndexKey, Value>;
/// Message level of one board
pub type MessageMap = BTreeMap<String, IndexMap>;

/// Counts reported by a single merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Index values written (new or replaced)
    pub written: usize,
    /// Board or message entries ignored because they were not mappings
    pub skipped: usize,
    /// Boards and messages seen for the first time
    pub created: usize,
}

impl MergeOutcome {
    /// Whether the merge left the state different from before
    pub fn changed(&self) -> bool {
        self.written > 0 || self.created > 0
    }
}

/// Union of all records, last write wins at the index level.
#[derive(Debug, Clone, Default)]
pub struct AccumulatedState {
    boards: BTreeMap<String, MessageMap>,
    merges: u64,
}

impl AccumulatedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one record.
    ///
    /// Boards and messages are created when absent. The value at each index
    /// overwrites the stored one without looking inside it.
    pub fn merge(&mut self, record: &TelemetryRecord) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        self.merges += 1;

        for (board, messages) in record.boards() {
            let Some(messages) = messages.as_object() else {
                debug!(board = %board, "Ignoring board that is not a mapping");
                outcome.skipped += 1;
                continue;
            };

            if !self.boards.contains_key(board) {
                outcome.created += 1;
            }
            let board_entry = self.boards.entry(board.clone()).or_default();

            for (message, indices) in messages {
                let Some(entries) = index_entries(indices) else {
                    debug!(board = %board, message = %message, "Ignoring message that is not a mapping");
                    outcome.skipped += 1;
                    continue;
                };

                if !board_entry.contains_key(message) {
                    outcome.created += 1;
                }
                let message_entry = board_entry.entry(message.clone()).or_default();
                for (index, value) in entries {
                    message_entry.insert(index, value.clone());
                    outcome.written += 1;
                }
            }
        }

        outcome
    }

    pub fn get(&self, board: &str, message: &str, index: &IndexKey) -> Option<&Value> {
        self.boards.get(board)?.get(message)?.get(index)
    }

    pub fn boards(&self) -> impl Iterator<Item = (&String, &MessageMap)> {
        self.boards.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    /// Number of stored index values across all boards and messages
    pub fn leaf_count(&self) -> usize {
        self.boards
            .values()
            .flat_map(|messages| messages.values())
            .map(|indices| indices.len())
            .sum()
    }

    /// Records merged so far
    pub fn merges(&self) -> u64 {
        self.merges
    }
}
