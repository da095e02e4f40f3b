//! Presenter state
//!
//! This module contains the state containers the presenters own:
//! - AccumulatedState: union of all records for the tree view
//! - TraceSeries: bounded or unbounded point history for one chart trace
//! - MergePolicy: the named rule a presenter applies to partial data

pub mod accumulator;
pub mod policy;
pub mod series;

pub use accumulator::{AccumulatedState, IndexMap, MergeOutcome, MessageMap};
pub use policy::MergePolicy;
pub use series::{RetentionPolicy, TracePoint, TraceSeries, DEFAULT_MAX_POINTS};
