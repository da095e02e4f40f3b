//! Chart trace series with a retention policy.
//!
//! A series is an append-only sequence of `(timestamp, value)` points. The
//! retention policy decides whether old points are evicted once the series
//! reaches its capacity.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Points kept per trace when no retention is configured
pub const DEFAULT_MAX_POINTS: usize = 2000;

// ============================================================================
// Retention Policy
// ============================================================================

/// How much history a trace keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep every point for the lifetime of the dashboard
    Unbounded,
    /// Ring buffer: keep the newest `n` points, evicting the oldest first
    MaxPoints(usize),
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::MaxPoints(DEFAULT_MAX_POINTS)
    }
}

impl RetentionPolicy {
    /// Build a policy from a point count; `0` means unbounded.
    pub fn from_points(points: usize) -> Self {
        if points == 0 {
            RetentionPolicy::Unbounded
        } else {
            RetentionPolicy::MaxPoints(points)
        }
    }

    /// Maximum number of points kept, if bounded
    pub fn capacity(&self) -> Option<usize> {
        match self {
            RetentionPolicy::Unbounded => None,
            RetentionPolicy::MaxPoints(n) => Some((*n).max(1)),
        }
    }

    pub fn label(&self) -> String {
        match self {
            RetentionPolicy::Unbounded => "unbounded".to_string(),
            RetentionPolicy::MaxPoints(n) => format!("last {} points", n),
        }
    }
}

// ============================================================================
// Trace Series
// ============================================================================

/// A single sample on a trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    /// Client-side time the record was processed
    pub at: DateTime<Utc>,
    pub value: f64,
}

/// Ordered points of one trace
#[derive(Debug, Clone)]
pub struct TraceSeries {
    points: VecDeque<TracePoint>,
    retention: RetentionPolicy,
    /// Points ever appended, including evicted ones
    appended: u64,
}

impl TraceSeries {
    pub fn new(retention: RetentionPolicy) -> Self {
        let initial = retention.capacity().unwrap_or(0).min(DEFAULT_MAX_POINTS);
        Self {
            points: VecDeque::with_capacity(initial),
            retention,
            appended: 0,
        }
    }

    /// Append a point, returning the evicted point if the buffer was full.
    pub fn push(&mut self, at: DateTime<Utc>, value: f64) -> Option<TracePoint> {
        self.points.push_back(TracePoint { at, value });
        self.appended += 1;

        match self.retention.capacity() {
            Some(cap) if self.points.len() > cap => self.points.pop_front(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total points ever appended to this trace
    pub fn appended(&self) -> u64 {
        self.appended
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub fn last(&self) -> Option<&TracePoint> {
        self.points.back()
    }

    pub fn points(&self) -> impl DoubleEndedIterator<Item = &TracePoint> + ExactSizeIterator {
        self.points.iter()
    }

    /// Newest `n` points, oldest first
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &TracePoint> {
        let skip = self.points.len().saturating_sub(n);
        self.points.iter().skip(skip)
    }

    /// Minimum and maximum retained values, ignoring NaN
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .map(|p| p.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
