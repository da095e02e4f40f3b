//! Presenters
//!
//! Both presenters consume every record from the stream:
//! - [`ChartPresenter`] appends numeric signals to rolling series
//! - [`TreePresenter`] merges records and rebuilds its rows
//!
//! Panel declarations live in [`panels`].

pub mod chart;
pub mod panels;
pub mod tree;

pub use chart::{ChartPanel, ChartPresenter};
pub use panels::{AxisSide, PanelSpec, TraceSpec, PANELS};
pub use tree::{compact_json, NodePath, TreePresenter, TreeRow};
