pub mod lasso;
pub mod tooltip;
pub mod viewport_sync;

pub use lasso::{LassoClassification, LassoConfig, LassoSelector, point_in_polygon};
pub use tooltip::{TooltipController, TooltipRow, TooltipState};
pub use viewport_sync::{
    BrushExtent, GestureSource, SyncOutcome, ViewportSync, WindowUpdate, ZoomLimits, ZoomTransform,
};
