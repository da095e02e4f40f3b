//! Telemetry record model
//!
//! A record is one decoded CAN packet as pushed by the telemetry server:
//!
//! ```text
//! { board: { message: { index: { signal: value, ... } } } }
//! ```
//!
//! The index level arrives either as an object keyed by decimal strings
//! (`{"0": {...}}`) or as an array (`[{...}]`). Both shapes are read through
//! the same helpers so callers never care which one the server used.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// Index Key
// ============================================================================

/// Key of the third (index) level of a record.
///
/// Numeric keys order before named keys and compare numerically, so `"2"`
/// sorts before `"10"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Decimal index, the common case
    Position(u64),
    /// Anything that is not a plain decimal
    Name(String),
}

impl IndexKey {
    /// Parse a JSON object key into an index key.
    pub fn parse(raw: &str) -> Self {
        let is_decimal = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());
        match raw.parse::<u64>() {
            Ok(position) if is_decimal && (raw == "0" || !raw.starts_with('0')) => {
                IndexKey::Position(position)
            }
            _ => IndexKey::Name(raw.to_string()),
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Position(position) => write!(f, "{}", position),
            IndexKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<usize> for IndexKey {
    fn from(position: usize) -> Self {
        IndexKey::Position(position as u64)
    }
}

// ============================================================================
// Telemetry Record
// ============================================================================

/// One decoded telemetry message, keyed by board at the top level.
///
/// Deserializing anything other than a JSON object fails, which is how the
/// stream subscriber detects a malformed payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetryRecord(Map<String, Value>);

impl TelemetryRecord {
    /// Decode a record from the text of an SSE `data` payload.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Wrap an already-parsed JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Iterate over `(board, value)` pairs.
    pub fn boards(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Optional lookup of `board.message[index]`.
    ///
    /// Returns `None` as soon as any level is missing or has the wrong shape;
    /// a missing level is never an error.
    pub fn lookup(&self, board: &str, message: &str, index: usize) -> Option<&Value> {
        let messages = self.0.get(board)?.as_object()?;
        index_at(messages.get(message)?, index)
    }

    /// Like [`lookup`](Self::lookup) but tries several message names in order.
    pub fn lookup_any(&self, board: &str, messages: &[&str], index: usize) -> Option<&Value> {
        messages
            .iter()
            .find_map(|message| self.lookup(board, message, index))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Entry at position `index` of an index-level container.
pub fn index_at(container: &Value, index: usize) -> Option<&Value> {
    match container {
        Value::Array(items) => items.get(index),
        Value::Object(map) => map.get(&index.to_string()),
        _ => None,
    }
}

/// All `(key, value)` entries of an index-level container.
///
/// Returns `None` when the container is neither an array nor an object.
pub fn index_entries(container: &Value) -> Option<Vec<(IndexKey, &Value)>> {
    match container {
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(position, value)| (IndexKey::from(position), value))
                .collect(),
        ),
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, value)| (IndexKey::parse(key), value))
                .collect(),
        ),
        _ => None,
    }
}

/// Read a numeric signal from a sub-record.
///
/// Booleans count as 0/1 so bitfield flags can be charted; anything else
/// that is not a number yields `None`.
pub fn signal_value(sub_record: &Value, field: &str) -> Option<f64> {
    match sub_record.as_object()?.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
