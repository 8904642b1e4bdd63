pub mod layout;
pub mod margin;
pub mod scale;
pub mod types;

pub use layout::{PlotLayout, ScaleSet, fit_zoom_level};
pub use margin::{Margin, MarginResolver, MonospaceMeasurer, TextMeasurer};
pub use scale::{BandScale, LinearScale, extent, pad_linear, quantile};
pub use types::{
    DataPoint, DimensionCell, DimensionValue, Identity, MeasureCell, Point, ValueFormatter,
    Viewport,
};
