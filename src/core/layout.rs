use serde::{Deserialize, Serialize};

use crate::core::margin::Margin;
use crate::core::scale::{BandScale, LinearScale, extent, pad_linear};
use crate::core::types::{DataPoint, Viewport};
use crate::error::{ChartError, ChartResult};

/// Fraction of the inner height handed to the overview strip.
const OVERVIEW_HEIGHT_RATIO: f64 = 0.175;

/// Band padding for overview marks.
const OVERVIEW_BAND_PADDING: f64 = 0.35;

/// Symmetric y-domain padding factor (total; half per side).
const Y_PAD_FACTOR: f64 = 0.7;

/// Inner plot geometry after margins are carved out of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotLayout {
    /// Inner plot width.
    pub inner_width: f64,
    /// Main plot height.
    pub main_height: f64,
    /// Overview strip height; zero when the chart fits without one.
    pub overview_height: f64,
}

impl PlotLayout {
    /// Carves the plot areas out of the viewport.
    ///
    /// When `zoomed` the middle margin separates main plot and overview and
    /// the overview takes a fixed share of the inner height; otherwise the
    /// overview collapses to zero.
    pub fn compute(viewport: Viewport, margin: Margin, zoomed: bool) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let inner_width = f64::from(viewport.width) - margin.horizontal();
        let vertical = if zoomed {
            margin.top + margin.middle + margin.bottom
        } else {
            margin.top + margin.middle
        };
        let inner_height = f64::from(viewport.height) - vertical;
        let overview_height = if zoomed {
            inner_height * OVERVIEW_HEIGHT_RATIO
        } else {
            0.0
        };

        if inner_width <= 0.0 || inner_height - overview_height <= 0.0 {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        Ok(Self {
            inner_width,
            main_height: inner_height - overview_height,
            overview_height,
        })
    }
}

/// Zoom level at which every mark gets at least 23 px of horizontal room.
///
/// `1.0` means the data already fits; larger values engage the overview
/// strip and the brush.
#[must_use]
pub fn fit_zoom_level(inner_width: f64, row_count: usize, overview_enabled: bool) -> f64 {
    if !overview_enabled || row_count == 0 || inner_width <= 0.0 {
        return 1.0;
    }
    (23.0 / (inner_width / row_count as f64)).max(1.0)
}

/// The coordinate mappings for one chart render pass.
///
/// `x`/`y` drive the main plot; `box_x`/`box_y` exist only for charts with
/// an overview strip and always describe the full static data domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSet {
    pub x: LinearScale,
    pub y: LinearScale,
    pub box_x: Option<BandScale>,
    pub box_y: Option<LinearScale>,
}

impl ScaleSet {
    /// Derives scales from rows sorted by primary dimension.
    ///
    /// Returns `None` for an empty data set: the caller renders a placeholder
    /// instead of marks, and no scale state is produced at all.
    pub fn from_rows(
        rows: &[DataPoint],
        layout: PlotLayout,
        tick_count: usize,
        with_overview: bool,
    ) -> ChartResult<Option<Self>> {
        if rows.is_empty() {
            return Ok(None);
        }

        let x_extent = extent(
            rows.iter()
                .filter_map(|row| row.primary_dimension().and_then(|value| value.as_f64())),
        )
        .ok_or_else(|| {
            ChartError::InvalidData("no finite dimension values to build an x scale".to_owned())
        })?;

        let y_extent = extent(rows.iter().filter_map(|row| row.measure_value(0)))
            .ok_or_else(|| {
                ChartError::InvalidData("no finite measure values to build a y scale".to_owned())
            })?;

        let mut x = LinearScale::new(
            widen_degenerate(x_extent),
            (0.0, layout.inner_width),
        )?;
        x.nice(tick_count);

        let mut y = LinearScale::new(
            widen_degenerate(pad_linear(y_extent, Y_PAD_FACTOR)),
            (layout.main_height, 0.0),
        )?;
        y.nice(tick_count);

        let (box_x, box_y) = if with_overview {
            let keys = rows
                .iter()
                .filter_map(|row| row.primary_dimension().and_then(|value| value.as_f64()))
                .collect();
            let box_x = BandScale::new(keys, (0.0, layout.inner_width), OVERVIEW_BAND_PADDING)?;
            let box_y = LinearScale::new(y.domain(), (layout.overview_height, 0.0))?;
            (Some(box_x), Some(box_y))
        } else {
            (None, None)
        };

        Ok(Some(Self { x, y, box_x, box_y }))
    }
}

fn widen_degenerate(extent: (f64, f64)) -> (f64, f64) {
    if extent.0 == extent.1 {
        (extent.0 - 0.5, extent.1 + 0.5)
    } else {
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DimensionCell, Identity, MeasureCell};

    fn margin() -> Margin {
        Margin {
            top: 30.0,
            right: 40.0,
            bottom: 20.0,
            left: 80.0,
            middle: 50.0,
        }
    }

    fn rows() -> Vec<DataPoint> {
        [(1, 1.0, 10.0), (2, 2.0, 5.0), (3, 3.0, 8.0), (4, 4.0, 3.0), (5, 5.0, 12.0)]
            .into_iter()
            .map(|(id, x, y)| {
                DataPoint::new(
                    Identity(id),
                    [DimensionCell::numeric("Day", x)],
                    [MeasureCell::new("Value", y)],
                )
            })
            .collect()
    }

    #[test]
    fn overview_collapses_when_not_zoomed() {
        let layout = PlotLayout::compute(Viewport::new(800, 600), margin(), false).expect("layout");
        assert_eq!(layout.overview_height, 0.0);
    }

    #[test]
    fn zoomed_layout_reserves_overview_share() {
        let layout = PlotLayout::compute(Viewport::new(800, 600), margin(), true).expect("layout");
        assert!(layout.overview_height > 0.0);
        let inner = layout.main_height + layout.overview_height;
        assert!((layout.overview_height - inner * OVERVIEW_HEIGHT_RATIO).abs() < 1e-9);
    }

    #[test]
    fn fit_zoom_is_identity_for_sparse_data() {
        assert_eq!(fit_zoom_level(1000.0, 5, true), 1.0);
        assert!(fit_zoom_level(100.0, 50, true) > 1.0);
        assert_eq!(fit_zoom_level(100.0, 50, false), 1.0);
    }

    #[test]
    fn empty_rows_produce_no_scales() {
        let layout = PlotLayout::compute(Viewport::new(800, 600), margin(), false).expect("layout");
        let scales = ScaleSet::from_rows(&[], layout, 10, false).expect("ok");
        assert!(scales.is_none());
    }

    #[test]
    fn y_domain_padding_contains_extremes_with_slack() {
        let layout = PlotLayout::compute(Viewport::new(800, 600), margin(), false).expect("layout");
        let scales = ScaleSet::from_rows(&rows(), layout, 10, false)
            .expect("ok")
            .expect("scales");
        let (lo, hi) = scales.y.domain();
        assert!(lo < 3.0);
        assert!(hi > 12.0);
    }
}
