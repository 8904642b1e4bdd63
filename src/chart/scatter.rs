//! Scatter plot: dots at `(measure 0, measure 1)`, optional third measure
//! driving dot size.
//!
//! The first measure is pre-normalized to `[0, 1]` by the data layer, so
//! the x scale is fixed rather than derived from the rows.

use indexmap::IndexMap;

use crate::chart::{FrameContext, push_axes};
use crate::core::scale::{LinearScale, extent};
use crate::core::{DataPoint, Identity, Point};
use crate::error::{ChartError, ChartResult};
use crate::join::{DataJoin, JoinPlan, JoinTimings, MarkAttrs, POSITION_TRANSITION_MS};
use crate::render::{CirclePrimitive, RectPrimitive, RenderFrame};
use crate::select::resolve_highlight;

/// Dot radius range the optional size measure maps onto.
const DOT_RADIUS_RANGE: (f64, f64) = (4.0, 8.0);
/// Fixed radius when no size measure is present, as a fraction of the
/// summed range bounds.
const FIXED_RADIUS_FACTOR: f64 = 0.4;
/// Radius multiplier for selected dots.
const SELECTED_RADIUS_BOOST: f64 = 1.15;
/// Entering dots grow out of the baseline over this duration.
const ENTER_TRANSITION_MS: u64 = 800;
/// Leaving dots sink back into the baseline over this duration.
const EXIT_TRANSITION_MS: u64 = 600;

pub struct ScatterChart {
    join: DataJoin,
}

impl Default for ScatterChart {
    fn default() -> Self {
        Self::new()
    }
}

impl ScatterChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            join: DataJoin::new(),
        }
    }

    /// Derives the scatter scale pair for one pass.
    pub fn scales(
        rows: &[DataPoint],
        ctx: &FrameContext<'_>,
    ) -> ChartResult<Option<(LinearScale, LinearScale)>> {
        if rows.is_empty() {
            return Ok(None);
        }

        let x = LinearScale::new((0.0, 1.0), (0.0, ctx.layout.inner_width))?;

        // The y domain is anchored at zero rather than the data minimum.
        let (_, y_max) = extent(rows.iter().filter_map(|row| row.measure_value(1)))
            .ok_or_else(|| {
                ChartError::InvalidData("no finite y-measure values for scatter".to_owned())
            })?;
        let y_domain = if y_max <= 0.0 { (0.0, 1.0) } else { (0.0, y_max) };
        let mut y = LinearScale::new(y_domain, (ctx.layout.main_height, 0.0))?;
        y.nice(ctx.y_tick_count);

        Ok(Some((x, y)))
    }

    /// Joins sorted rows, growing entering dots from the baseline.
    pub fn join(
        &mut self,
        rows: &[DataPoint],
        x: LinearScale,
        y: LinearScale,
        ctx: &FrameContext<'_>,
    ) -> ChartResult<JoinPlan> {
        // Dots are colored by the size measure when one exists, so color
        // and radius encode the same quantity. Without it, color falls
        // back to the y measure.
        let size_extent = extent(rows.iter().filter_map(|row| row.measure_value(2)));
        let color_domain = size_extent
            .or_else(|| extent(rows.iter().filter_map(|row| row.measure_value(1))))
            .unwrap_or((0.0, 1.0));
        let colors = ctx.theme.sequential(color_domain);
        let color_by_size = size_extent.is_some();
        let size = size_scale(rows);

        let origin_x = ctx.margin.left;
        let origin_y = ctx.margin.top;
        let baseline = origin_y + ctx.layout.main_height;
        let selection = ctx.selection;
        let theme = ctx.theme;

        self.join.join_with(
            rows,
            |row| {
                let px = row.measure_value(0).unwrap_or(0.0).clamp(0.0, 1.0);
                let py = row.measure_value(1).unwrap_or(0.0);
                let highlight = resolve_highlight(row.identity, selection, theme);
                let radius = match (&size, row.measure_value(2)) {
                    (Some(scale), Some(value)) => scale
                        .scale(value)
                        .clamp(DOT_RADIUS_RANGE.0, DOT_RADIUS_RANGE.1),
                    _ => (DOT_RADIUS_RANGE.0 + DOT_RADIUS_RANGE.1) * FIXED_RADIUS_FACTOR,
                };
                let radius = if selection.contains(row.identity) {
                    radius * SELECTED_RADIUS_BOOST
                } else {
                    radius
                };
                let color_value = if color_by_size {
                    row.measure_value(2).unwrap_or(py)
                } else {
                    py
                };
                MarkAttrs {
                    x: origin_x + x.scale(px),
                    y: origin_y + y.scale(py),
                    radius,
                    opacity: highlight.opacity,
                    fill: colors.color_at(color_value),
                    stroke: highlight.stroke,
                    stroke_width: 1.0,
                }
            },
            |attrs| MarkAttrs {
                y: baseline,
                radius: 0.0,
                opacity: 0.0,
                ..attrs
            },
            |attrs| MarkAttrs {
                y: baseline,
                radius: 0.0,
                opacity: 0.0,
                ..attrs
            },
            JoinTimings {
                enter_ms: ENTER_TRANSITION_MS,
                update_ms: POSITION_TRANSITION_MS,
                exit_ms: EXIT_TRANSITION_MS,
            },
        )
    }

    pub fn frame(
        &self,
        ctx: &FrameContext<'_>,
        x: LinearScale,
        y: LinearScale,
    ) -> ChartResult<RenderFrame> {
        let mut frame = RenderFrame::new(ctx.viewport);
        frame.rects.push(RectPrimitive {
            x: 0.0,
            y: 0.0,
            width: f64::from(ctx.viewport.width),
            height: f64::from(ctx.viewport.height),
            fill: ctx.theme.background_color,
        });

        push_axes(&mut frame, ctx, x, y);

        for attrs in self.join.marks().values() {
            frame.circles.push(CirclePrimitive {
                cx: attrs.x,
                cy: attrs.y,
                radius: attrs.radius,
                fill: attrs.fill,
                opacity: attrs.opacity,
                stroke: attrs.stroke,
                stroke_width: attrs.stroke_width,
            });
        }

        frame.validate()?;
        Ok(frame)
    }

    #[must_use]
    pub fn mark_positions(&self) -> Vec<(Identity, Point)> {
        self.join
            .marks()
            .iter()
            .map(|(identity, attrs)| (*identity, Point::new(attrs.x, attrs.y)))
            .collect()
    }

    #[must_use]
    pub fn mark_attrs(&self, identity: Identity) -> Option<MarkAttrs> {
        self.join.marks().get(&identity).copied()
    }

    #[must_use]
    pub fn marks(&self) -> &IndexMap<Identity, MarkAttrs> {
        self.join.marks()
    }
}

/// Maps the third measure's extent onto the dot radius range. `None` when
/// no row carries a finite size measure.
fn size_scale(rows: &[DataPoint]) -> Option<LinearScale> {
    let (lo, hi) = extent(rows.iter().filter_map(|row| row.measure_value(2)))?;
    let domain = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
    LinearScale::new(domain, DOT_RADIUS_RANGE).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::PlotLayout;
    use crate::core::margin::Margin;
    use crate::core::{DimensionCell, MeasureCell, Viewport};
    use crate::select::SelectionState;
    use crate::theme::ThemeConfig;

    fn rows() -> Vec<DataPoint> {
        [
            (1u64, 0.1, 10.0, 1.0),
            (2, 0.5, 5.0, 2.0),
            (3, 0.9, 8.0, 3.0),
        ]
        .into_iter()
        .map(|(id, x, y, size)| {
            DataPoint::new(
                Identity(id),
                [DimensionCell::numeric("Id", id as f64)],
                [
                    MeasureCell::new("X", x),
                    MeasureCell::new("Y", y),
                    MeasureCell::new("Size", size),
                ],
            )
        })
        .collect()
    }

    fn ctx_parts() -> (Viewport, Margin, PlotLayout) {
        let viewport = Viewport::new(800, 600);
        let margin = Margin {
            top: 30.0,
            right: 40.0,
            bottom: 20.0,
            left: 80.0,
            middle: 50.0,
        };
        let layout = PlotLayout::compute(viewport, margin, false).expect("layout");
        (viewport, margin, layout)
    }

    #[test]
    fn dots_enter_from_the_baseline_over_800ms() {
        let (viewport, margin, layout) = ctx_parts();
        let theme = ThemeConfig::default();
        let selection = SelectionState::default();
        let ctx = FrameContext {
            viewport,
            margin,
            layout,
            theme: &theme,
            selection: &selection,
            x_tick_count: 10,
            y_tick_count: 10,
        };

        let rows = rows();
        let (x, y) = ScatterChart::scales(&rows, &ctx).expect("ok").expect("scales");
        let mut chart = ScatterChart::new();
        let plan = chart.join(&rows, x, y, &ctx).expect("join");

        assert_eq!(plan.enter.len(), 3);
        let baseline = margin.top + layout.main_height;
        for transition in &plan.enter {
            assert_eq!(transition.duration_ms, 800);
            assert_eq!(transition.from.y, baseline);
            assert_eq!(transition.from.radius, 0.0);
            assert!(transition.to.y < baseline);
        }
    }

    #[test]
    fn size_measure_maps_into_radius_range_and_selection_boosts() {
        let (viewport, margin, layout) = ctx_parts();
        let theme = ThemeConfig::default();
        let selection = SelectionState::new([Identity(3)], Some(1));
        let ctx = FrameContext {
            viewport,
            margin,
            layout,
            theme: &theme,
            selection: &selection,
            x_tick_count: 10,
            y_tick_count: 10,
        };

        let rows = rows();
        let (x, y) = ScatterChart::scales(&rows, &ctx).expect("ok").expect("scales");
        let mut chart = ScatterChart::new();
        chart.join(&rows, x, y, &ctx).expect("join");

        let small = chart.mark_attrs(Identity(1)).expect("mark");
        assert_eq!(small.radius, 4.0);
        let selected = chart.mark_attrs(Identity(3)).expect("mark");
        assert!((selected.radius - 8.0 * 1.15).abs() < 1e-9);
    }

    #[test]
    fn removed_dots_exit_to_the_baseline_over_600ms() {
        let (viewport, margin, layout) = ctx_parts();
        let theme = ThemeConfig::default();
        let selection = SelectionState::default();
        let ctx = FrameContext {
            viewport,
            margin,
            layout,
            theme: &theme,
            selection: &selection,
            x_tick_count: 10,
            y_tick_count: 10,
        };

        let rows = rows();
        let (x, y) = ScatterChart::scales(&rows, &ctx).expect("ok").expect("scales");
        let mut chart = ScatterChart::new();
        chart.join(&rows, x, y, &ctx).expect("first");

        let remaining = &rows[..2];
        let plan = chart.join(remaining, x, y, &ctx).expect("second");
        assert_eq!(plan.exit.len(), 1);
        assert_eq!(plan.exit[0].duration_ms, 600);
        assert_eq!(plan.exit[0].to.y, margin.top + layout.main_height);
    }
}
