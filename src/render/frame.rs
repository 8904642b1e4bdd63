use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    ArcPrimitive, CirclePrimitive, LinePrimitive, PathPrimitive, RectPrimitive, TextPrimitive,
};

/// Backend-agnostic scene for one chart draw pass.
///
/// A frame with `placeholder` set carries no marks; it is the neutral
/// "no data" state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    pub viewport: Option<Viewport>,
    pub circles: Vec<CirclePrimitive>,
    pub paths: Vec<PathPrimitive>,
    pub arcs: Vec<ArcPrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub lines: Vec<LinePrimitive>,
    pub texts: Vec<TextPrimitive>,
    pub placeholder: Option<String>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn placeholder(viewport: Viewport, message: impl Into<String>) -> Self {
        Self {
            viewport: Some(viewport),
            placeholder: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
            && self.paths.is_empty()
            && self.arcs.is_empty()
            && self.rects.is_empty()
            && self.lines.is_empty()
            && self.texts.is_empty()
    }

    pub fn validate(&self) -> ChartResult<()> {
        if let Some(viewport) = self.viewport
            && !viewport.is_valid()
        {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        for circle in &self.circles {
            circle.validate()?;
        }
        for path in &self.paths {
            path.validate()?;
        }
        for arc in &self.arcs {
            arc.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for line in &self.lines {
            line.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }
        Ok(())
    }
}
