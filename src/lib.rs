//! chartflow: interactive statistical chart engine.
//!
//! This crate turns normalized rows into backend-agnostic render frames for
//! line, scatter, and pie charts, and coordinates the gestures around them:
//! pan/zoom synchronized with an overview brush, lasso selection, hover
//! tooltips, and external-selection highlighting.

pub mod api;
pub mod chart;
pub mod core;
pub mod data;
pub mod error;
pub mod interaction;
pub mod join;
pub mod render;
pub mod select;
pub mod telemetry;
pub mod theme;

pub use api::{ChartEngine, ChartEngineConfig, ChartEvent};
pub use chart::ChartKind;
pub use error::{ChartError, ChartResult};
