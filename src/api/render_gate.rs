use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

use super::ChartEngine;

/// Builds a frame only when something invalidated the last one.
pub fn build_frame_if_invalidated<R: Renderer>(
    engine: &mut ChartEngine<R>,
) -> ChartResult<Option<RenderFrame>> {
    if !engine.has_pending_invalidation() {
        return Ok(None);
    }
    engine.build_frame().map(Some)
}

/// Renders only when something invalidated the last frame.
pub fn render_if_invalidated<R: Renderer>(engine: &mut ChartEngine<R>) -> ChartResult<bool> {
    engine.render()
}
