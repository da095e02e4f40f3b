pub mod telemetry;

pub use telemetry::{index_at, index_entries, signal_value, IndexKey, TelemetryRecord};
