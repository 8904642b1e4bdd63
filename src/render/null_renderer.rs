use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// Renderer that validates and counts frames without drawing anything.
///
/// Headless tests assert against the frames it records.
#[derive(Debug, Default)]
pub struct NullRenderer {
    frames: usize,
    last_frame: Option<RenderFrame>,
}

impl NullRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames_rendered(&self) -> usize {
        self.frames
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
