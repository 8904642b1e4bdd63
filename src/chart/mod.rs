//! Chart variants.
//!
//! Each variant owns its per-surface join state and projects rows to mark
//! attributes; the shared pieces here are the variant registry with its
//! column-shape rules, the percentile color domain, and axis emission.

pub mod line;
pub mod pie;
pub mod scatter;

use serde::{Deserialize, Serialize};

use crate::core::margin::Margin;
use crate::core::scale::{LinearScale, quantile};
use crate::core::{DataPoint, Viewport};
use crate::core::layout::PlotLayout;
use crate::error::{ChartError, ChartResult};
use crate::render::{LinePrimitive, RenderFrame, TextHAlign, TextPrimitive};
use crate::select::SelectionState;
use crate::theme::ThemeConfig;

pub use line::LineChart;
pub use pie::PieChart;
pub use scatter::ScatterChart;

/// Mark radius on the main plot surface.
pub const MAIN_POINT_RADIUS: f64 = 3.0;
/// Mark radius on the overview strip.
pub const OVERVIEW_POINT_RADIUS: f64 = 1.0;
/// Opacity of overview marks outside the brushed window.
pub const OVERVIEW_DIM_OPACITY: f64 = 0.7;

/// Percentile bounds for mark color domains. Clipping the tails keeps a
/// handful of outliers from washing out the gradient.
const COLOR_DOMAIN_QUANTILES: (f64, f64) = (0.05, 0.9);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Scatter,
    Pie,
}

impl ChartKind {
    /// `(dimensions, min measures, max measures)` this variant accepts.
    #[must_use]
    pub const fn column_shape(self) -> (usize, usize, usize) {
        match self {
            Self::Line => (1, 1, 1),
            Self::Scatter => (1, 2, 3),
            Self::Pie => (1, 1, 1),
        }
    }

    /// Rejects rows whose column counts do not fit this variant.
    pub fn validate_rows(self, rows: &[DataPoint]) -> ChartResult<()> {
        let (dims, min_measures, max_measures) = self.column_shape();
        for row in rows {
            if row.dimensions.len() != dims {
                return Err(ChartError::InvalidData(format!(
                    "row {} carries {} dimensions, {self:?} requires {dims}",
                    row.identity,
                    row.dimensions.len()
                )));
            }
            let measures = row.measures.len();
            if measures < min_measures || measures > max_measures {
                return Err(ChartError::InvalidData(format!(
                    "row {} carries {measures} measures, {self:?} requires \
                     {min_measures}..={max_measures}",
                    row.identity
                )));
            }
        }
        Ok(())
    }
}

/// Shared per-pass context handed to every variant.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub viewport: Viewport,
    pub margin: Margin,
    pub layout: PlotLayout,
    pub theme: &'a ThemeConfig,
    pub selection: &'a SelectionState,
    pub x_tick_count: usize,
    pub y_tick_count: usize,
}

/// Color domain over the 5th..90th percentile of the first measure.
///
/// `None` when no finite measure values exist.
#[must_use]
pub fn percentile_color_domain(rows: &[DataPoint], measure_index: usize) -> Option<(f64, f64)> {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.measure_value(measure_index))
        .collect();
    let lo = quantile(&values, COLOR_DOMAIN_QUANTILES.0)?;
    let hi = quantile(&values, COLOR_DOMAIN_QUANTILES.1)?;
    Some((lo, hi))
}

/// Emits axis lines, tick labels, and optional grid lines for one
/// cartesian plot area anchored at the context margin.
pub fn push_axes(frame: &mut RenderFrame, ctx: &FrameContext<'_>, x: LinearScale, y: LinearScale) {
    let origin_x = ctx.margin.left;
    let origin_y = ctx.margin.top;
    let inner_width = ctx.layout.inner_width;
    let main_height = ctx.layout.main_height;
    let text = ctx.theme.axis_text;

    frame.lines.push(LinePrimitive {
        x1: origin_x,
        y1: origin_y + main_height,
        x2: origin_x + inner_width,
        y2: origin_y + main_height,
        stroke_width: 1.0,
        color: ctx.theme.axis_line_stroke,
    });
    frame.lines.push(LinePrimitive {
        x1: origin_x,
        y1: origin_y,
        x2: origin_x,
        y2: origin_y + main_height,
        stroke_width: 1.0,
        color: ctx.theme.axis_line_stroke,
    });

    for tick in x.ticks(ctx.x_tick_count) {
        let px = x.scale(tick);
        // Panned ticks can land outside the plot area; skip them.
        if !(0.0..=inner_width).contains(&px) {
            continue;
        }
        frame.texts.push(TextPrimitive::new(
            format_tick(tick),
            origin_x + px,
            origin_y + main_height + text.font_size_px + 4.0,
            text.font_size_px,
            text.color,
            TextHAlign::Center,
        ));
    }

    for tick in y.ticks(ctx.y_tick_count) {
        let py = y.scale(tick);
        if !(0.0..=main_height).contains(&py) {
            continue;
        }
        frame.texts.push(TextPrimitive::new(
            format_tick(tick),
            origin_x - 6.0,
            origin_y + py + text.font_size_px / 3.0,
            text.font_size_px,
            text.color,
            TextHAlign::Right,
        ));
        if let Some(grid) = ctx.theme.grid_lines {
            frame.lines.push(LinePrimitive {
                x1: origin_x,
                y1: origin_y + py,
                x2: origin_x + inner_width,
                y2: origin_y + py,
                stroke_width: grid.stroke_width,
                color: grid.stroke,
            });
        }
    }
}

fn format_tick(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DimensionCell, Identity, MeasureCell};

    fn row(id: u64, measures: usize) -> DataPoint {
        DataPoint::new(
            Identity(id),
            [DimensionCell::numeric("Day", id as f64)],
            (0..measures).map(|i| MeasureCell::new("M", i as f64)),
        )
    }

    #[test]
    fn column_shapes_gate_each_variant() {
        assert!(ChartKind::Line.validate_rows(&[row(1, 1)]).is_ok());
        assert!(ChartKind::Line.validate_rows(&[row(1, 2)]).is_err());
        assert!(ChartKind::Scatter.validate_rows(&[row(1, 2)]).is_ok());
        assert!(ChartKind::Scatter.validate_rows(&[row(1, 3)]).is_ok());
        assert!(ChartKind::Scatter.validate_rows(&[row(1, 1)]).is_err());
        assert!(ChartKind::Pie.validate_rows(&[row(1, 1)]).is_ok());
    }

    #[test]
    fn percentile_domain_clips_the_tails() {
        let rows: Vec<DataPoint> = (0..=100)
            .map(|i| {
                DataPoint::new(
                    Identity(i),
                    [DimensionCell::numeric("Day", i as f64)],
                    [MeasureCell::new("Value", i as f64)],
                )
            })
            .collect();
        let (lo, hi) = percentile_color_domain(&rows, 0).expect("domain");
        assert!((lo - 5.0).abs() < 1e-9);
        assert!((hi - 90.0).abs() < 1e-9);
    }

    #[test]
    fn empty_rows_have_no_color_domain() {
        assert_eq!(percentile_color_domain(&[], 0), None);
    }
}
