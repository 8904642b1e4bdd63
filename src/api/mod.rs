//! Public engine surface: configuration, the engine itself, outbound
//! events, and the invalidation render gate.

mod engine;
mod engine_config;
mod events;
mod render_gate;

pub use engine::ChartEngine;
pub use engine_config::ChartEngineConfig;
pub use events::ChartEvent;
pub use render_gate::{build_frame_if_invalidated, render_if_invalidated};
