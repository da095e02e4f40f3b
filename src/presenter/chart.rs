//! Chart presenter.
//!
//! Holds one [`TraceSeries`] per declared trace. Every record is read at
//! each panel's source path; panels whose path is absent are left alone.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::models::{signal_value, TelemetryRecord};
use crate::presenter::panels::{PanelSpec, PANELS};
use crate::state::{MergePolicy, RetentionPolicy, TraceSeries};
use crate::traits::Presenter;

/// A panel and the series behind its traces
#[derive(Debug, Clone)]
pub struct ChartPanel {
    spec: &'static PanelSpec,
    traces: Vec<TraceSeries>,
    /// Bumped whenever any trace of this panel gains a point
    revision: u64,
}

impl ChartPanel {
    fn new(spec: &'static PanelSpec, retention: RetentionPolicy) -> Self {
        Self {
            spec,
            traces: spec
                .traces
                .iter()
                .map(|_| TraceSeries::new(retention))
                .collect(),
            revision: 0,
        }
    }

    pub fn spec(&self) -> &'static PanelSpec {
        self.spec
    }

    pub fn traces(&self) -> &[TraceSeries] {
        &self.traces
    }

    /// Series of the trace reading `field`
    pub fn trace(&self, field: &str) -> Option<&TraceSeries> {
        self.spec
            .traces
            .iter()
            .position(|t| t.field == field)
            .map(|i| &self.traces[i])
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append one point per numeric field found in `sub_record`.
    fn extend(&mut self, sub_record: &serde_json::Value, now: DateTime<Utc>) -> bool {
        let mut appended = false;
        for (spec, series) in self.spec.traces.iter().zip(self.traces.iter_mut()) {
            if let Some(value) = signal_value(sub_record, spec.field) {
                series.push(now, value);
                appended = true;
            }
        }
        if appended {
            self.revision += 1;
        }
        appended
    }
}

/// Rolling time-series charts over the fixed panels.
#[derive(Debug, Clone)]
pub struct ChartPresenter {
    panels: Vec<ChartPanel>,
    /// Time zero of the x axis
    origin: DateTime<Utc>,
    retention: RetentionPolicy,
    records_applied: u64,
}

impl ChartPresenter {
    /// Create the standard four panels, with the x axis starting now.
    pub fn new(retention: RetentionPolicy) -> Self {
        Self::with_panels(&PANELS, retention, Utc::now())
    }

    /// Create presenters over arbitrary panel declarations.
    pub fn with_panels(
        specs: &'static [PanelSpec],
        retention: RetentionPolicy,
        origin: DateTime<Utc>,
    ) -> Self {
        Self {
            panels: specs.iter().map(|s| ChartPanel::new(s, retention)).collect(),
            origin,
            retention,
            records_applied: 0,
        }
    }

    /// Apply a record and return the indices of panels that changed.
    pub fn apply(&mut self, record: &TelemetryRecord, now: DateTime<Utc>) -> Vec<usize> {
        self.records_applied += 1;

        let mut changed = Vec::new();
        for (i, panel) in self.panels.iter_mut().enumerate() {
            let spec = panel.spec;
            let Some(sub_record) = record.lookup_any(spec.board, spec.messages, spec.index) else {
                continue;
            };
            if panel.extend(sub_record, now) {
                trace!(panel = spec.id, revision = panel.revision, "Chart panel extended");
                changed.push(i);
            }
        }
        changed
    }

    pub fn panels(&self) -> &[ChartPanel] {
        &self.panels
    }

    pub fn panel(&self, id: &str) -> Option<&ChartPanel> {
        self.panels.iter().find(|p| p.spec.id == id)
    }

    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub fn records_applied(&self) -> u64 {
        self.records_applied
    }

    /// X coordinate of a timestamp, in seconds since the origin
    pub fn seconds_since_origin(&self, at: DateTime<Utc>) -> f64 {
        (at - self.origin).num_milliseconds() as f64 / 1000.0
    }
}

impl Presenter for ChartPresenter {
    fn name(&self) -> &'static str {
        "charts"
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::SkipAbsent
    }

    fn on_record(&mut self, record: &TelemetryRecord, now: DateTime<Utc>) -> bool {
        !self.apply(record, now).is_empty()
    }
}
