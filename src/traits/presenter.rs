//! Presenter trait abstraction.
//!
//! A presenter is a reducer over the incoming record stream: it owns its
//! state and updates it for every record, nothing else writes to it.

use chrono::{DateTime, Utc};

use crate::models::TelemetryRecord;
use crate::state::MergePolicy;

/// Trait for anything that consumes telemetry records.
///
/// # Example
///
/// ```ignore
/// use candash::traits::Presenter;
///
/// fn feed<P: Presenter>(presenter: &mut P, records: &[TelemetryRecord]) {
///     let now = chrono::Utc::now();
///     for record in records {
///         presenter.on_record(record, now);
///     }
/// }
/// ```
pub trait Presenter {
    /// Short name for logs and the status bar
    fn name(&self) -> &'static str;

    /// The rule applied to partial or absent data
    fn merge_policy(&self) -> MergePolicy;

    /// Apply one record processed at `now`.
    ///
    /// Returns `true` when the presenter's visible state changed.
    fn on_record(&mut self, record: &TelemetryRecord, now: DateTime<Utc>) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        seen: usize,
    }

    impl Presenter for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn merge_policy(&self) -> MergePolicy {
            MergePolicy::SkipAbsent
        }

        fn on_record(&mut self, record: &TelemetryRecord, _now: DateTime<Utc>) -> bool {
            if record.is_empty() {
                return false;
            }
            self.seen += 1;
            true
        }
    }

    #[test]
    fn test_presenter_as_trait_object() {
        let mut counter = Counter { seen: 0 };
        let presenter: &mut dyn Presenter = &mut counter;

        let record = TelemetryRecord::from_json(r#"{"a": {}}"#).unwrap();
        assert!(presenter.on_record(&record, Utc::now()));
        assert!(!presenter.on_record(&TelemetryRecord::default(), Utc::now()));
        assert_eq!(presenter.name(), "counter");
        assert_eq!(counter.seen, 1);
    }
}
