//! Line chart: a path through value points, with an overview strip and
//! brush once the data no longer fits at zoom level 1.

use indexmap::IndexMap;

use crate::chart::{
    FrameContext, MAIN_POINT_RADIUS, OVERVIEW_DIM_OPACITY, OVERVIEW_POINT_RADIUS,
    percentile_color_domain, push_axes,
};
use crate::core::layout::ScaleSet;
use crate::core::scale::quantile;
use crate::core::{DataPoint, Identity, Point};
use crate::error::{ChartError, ChartResult};
use crate::interaction::BrushExtent;
use crate::join::{DataJoin, JoinPlan, MarkAttrs, POSITION_TRANSITION_MS};
use crate::render::{CirclePrimitive, Color, PathPrimitive, RectPrimitive, RenderFrame};
use crate::select::resolve_highlight;

pub struct LineChart {
    main: DataJoin,
    overview: DataJoin,
    path_stroke: Option<Color>,
}

impl Default for LineChart {
    fn default() -> Self {
        Self::new()
    }
}

impl LineChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            main: DataJoin::new(),
            overview: DataJoin::new(),
            path_stroke: None,
        }
    }

    /// Joins sorted rows against both surfaces, committing new mark state.
    ///
    /// The overview plan is `None` while the chart fits without a strip.
    pub fn join(
        &mut self,
        rows: &[DataPoint],
        scales: &ScaleSet,
        ctx: &FrameContext<'_>,
        brush: Option<BrushExtent>,
    ) -> ChartResult<(JoinPlan, Option<JoinPlan>)> {
        let color_domain = percentile_color_domain(rows, 0).unwrap_or((0.0, 1.0));
        let colors = ctx.theme.sequential(color_domain);

        // The path takes the gradient color at the median value; every dot
        // takes the color at the maximum, on both surfaces.
        let values: Vec<f64> = rows.iter().filter_map(|row| row.measure_value(0)).collect();
        let median = quantile(&values, 0.5).unwrap_or(color_domain.1);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        self.path_stroke = Some(colors.color_at(median));
        let dot_fill = colors.color_at(if max.is_finite() { max } else { color_domain.1 });

        let origin_x = ctx.margin.left;
        let origin_y = ctx.margin.top;
        let selection = ctx.selection;
        let theme = ctx.theme;

        let main_plan = self.main.join(
            rows,
            |row| {
                let x = row
                    .primary_dimension()
                    .and_then(|value| value.as_f64())
                    .unwrap_or(0.0);
                let y = row.measure_value(0).unwrap_or(0.0);
                let highlight = resolve_highlight(row.identity, selection, theme);
                MarkAttrs {
                    x: origin_x + scales.x.scale(x),
                    y: origin_y + scales.y.scale(y),
                    radius: MAIN_POINT_RADIUS,
                    opacity: highlight.opacity,
                    fill: dot_fill,
                    stroke: highlight.stroke,
                    stroke_width: 1.0,
                }
            },
            MarkAttrs::collapsed,
            POSITION_TRANSITION_MS,
        )?;

        let overview_plan = match (&scales.box_x, &scales.box_y) {
            (Some(box_x), Some(box_y)) => {
                let strip_y = origin_y + ctx.layout.main_height + ctx.margin.middle;
                let plan = self.overview.join(
                    rows,
                    |row| {
                        let key = row
                            .primary_dimension()
                            .and_then(|value| value.as_f64())
                            .unwrap_or(0.0);
                        let y = row.measure_value(0).unwrap_or(0.0);
                        let px = box_x.position(key).unwrap_or(0.0);
                        let in_window = brush
                            .map(|extent| px >= extent.lo && px <= extent.hi)
                            .unwrap_or(true);
                        MarkAttrs {
                            x: origin_x + px,
                            y: strip_y + box_y.scale(y),
                            radius: OVERVIEW_POINT_RADIUS,
                            opacity: if in_window { 1.0 } else { OVERVIEW_DIM_OPACITY },
                            fill: dot_fill,
                            stroke: None,
                            stroke_width: 1.0,
                        }
                    },
                    MarkAttrs::collapsed,
                    POSITION_TRANSITION_MS,
                )?;
                Some(plan)
            }
            _ => None,
        };

        Ok((main_plan, overview_plan))
    }

    /// Builds the scene from committed mark state.
    pub fn frame(
        &self,
        ctx: &FrameContext<'_>,
        scales: &ScaleSet,
        brush: Option<BrushExtent>,
    ) -> ChartResult<RenderFrame> {
        let mut frame = RenderFrame::new(ctx.viewport);
        frame.rects.push(RectPrimitive {
            x: 0.0,
            y: 0.0,
            width: f64::from(ctx.viewport.width),
            height: f64::from(ctx.viewport.height),
            fill: ctx.theme.background_color,
        });

        push_axes(&mut frame, ctx, scales.x, scales.y);

        let stroke = self.path_stroke.ok_or_else(|| {
            ChartError::InvalidData("line frame requested before any join pass".to_owned())
        })?;

        // Zoomed scales project marks past the plot edges; the frame only
        // carries what lands inside.
        let plot_lo = ctx.margin.left;
        let plot_hi = plot_lo + ctx.layout.inner_width;
        let in_plot = |x: f64| (plot_lo..=plot_hi).contains(&x);

        let points: Vec<(f64, f64)> = self
            .main
            .marks()
            .values()
            .filter(|attrs| in_plot(attrs.x))
            .map(|attrs| (attrs.x, attrs.y))
            .collect();
        if points.len() >= 2 {
            frame.paths.push(PathPrimitive {
                points,
                stroke,
                stroke_width: 2.0,
            });
        }

        for attrs in self.main.marks().values().filter(|attrs| in_plot(attrs.x)) {
            frame.circles.push(circle(attrs));
        }

        if scales.box_x.is_some() {
            let strip_y = ctx.margin.top + ctx.layout.main_height + ctx.margin.middle;
            frame.rects.push(RectPrimitive {
                x: ctx.margin.left,
                y: strip_y,
                width: ctx.layout.inner_width,
                height: ctx.layout.overview_height,
                fill: ctx.theme.viewbox.background_fill,
            });
            if let Some(extent) = brush {
                frame.rects.push(RectPrimitive {
                    x: ctx.margin.left + extent.lo,
                    y: strip_y,
                    width: extent.hi - extent.lo,
                    height: ctx.layout.overview_height,
                    fill: ctx.theme.viewbox.selection_fill,
                });
            }
            for attrs in self.overview.marks().values() {
                frame.circles.push(circle(attrs));
            }
        }

        frame.validate()?;
        Ok(frame)
    }

    /// Committed main-surface mark centers, for hit testing and the lasso.
    #[must_use]
    pub fn mark_positions(&self) -> Vec<(Identity, Point)> {
        self.main
            .marks()
            .iter()
            .map(|(identity, attrs)| (*identity, Point::new(attrs.x, attrs.y)))
            .collect()
    }

    #[must_use]
    pub fn mark_attrs(&self, identity: Identity) -> Option<MarkAttrs> {
        self.main.marks().get(&identity).copied()
    }

    #[must_use]
    pub fn marks(&self) -> &IndexMap<Identity, MarkAttrs> {
        self.main.marks()
    }
}

fn circle(attrs: &MarkAttrs) -> CirclePrimitive {
    CirclePrimitive {
        cx: attrs.x,
        cy: attrs.y,
        radius: attrs.radius,
        fill: attrs.fill,
        opacity: attrs.opacity,
        stroke: attrs.stroke,
        stroke_width: attrs.stroke_width,
    }
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
        [(1u64, 1.0, 10.0), (2, 2.0, 5.0), (3, 3.0, 8.0), (4, 4.0, 3.0), (5, 5.0, 12.0)]
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

    fn margin() -> Margin {
        Margin {
            top: 30.0,
            right: 40.0,
            bottom: 20.0,
            left: 80.0,
            middle: 50.0,
        }
    }

    #[test]
    fn joined_marks_feed_an_ascending_path() {
        let viewport = Viewport::new(800, 600);
        let layout = PlotLayout::compute(viewport, margin(), false).expect("layout");
        let scales = ScaleSet::from_rows(&rows(), layout, 10, false)
            .expect("ok")
            .expect("scales");
        let theme = ThemeConfig::default();
        let selection = SelectionState::default();
        let ctx = FrameContext {
            viewport,
            margin: margin(),
            layout,
            theme: &theme,
            selection: &selection,
            x_tick_count: 10,
            y_tick_count: 10,
        };

        let mut chart = LineChart::new();
        let (plan, overview) = chart.join(&rows(), &scales, &ctx, None).expect("join");
        assert_eq!(plan.enter.len(), 5);
        assert!(overview.is_none());

        let frame = chart.frame(&ctx, &scales, None).expect("frame");
        assert_eq!(frame.paths.len(), 1);
        let xs: Vec<f64> = frame.paths[0].points.iter().map(|(x, _)| *x).collect();
        assert!(xs.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(frame.circles.len(), 5);
    }

    #[test]
    fn selected_mark_renders_highlighted() {
        let viewport = Viewport::new(800, 600);
        let layout = PlotLayout::compute(viewport, margin(), false).expect("layout");
        let scales = ScaleSet::from_rows(&rows(), layout, 10, false)
            .expect("ok")
            .expect("scales");
        let theme = ThemeConfig::default();
        let selection = SelectionState::new([Identity(3)], Some(1));
        let ctx = FrameContext {
            viewport,
            margin: margin(),
            layout,
            theme: &theme,
            selection: &selection,
            x_tick_count: 10,
            y_tick_count: 10,
        };

        let mut chart = LineChart::new();
        chart.join(&rows(), &scales, &ctx, None).expect("join");
        let attrs = chart.mark_attrs(Identity(3)).expect("mark");
        assert_eq!(attrs.opacity, 1.0);
        assert_eq!(attrs.stroke, Some(theme.selection_highlight));

        let other = chart.mark_attrs(Identity(1)).expect("mark");
        assert_eq!(other.opacity, theme.base_mark_opacity);
    }

    #[test]
    fn overview_marks_dim_outside_the_brush() {
        let viewport = Viewport::new(800, 600);
        let layout = PlotLayout::compute(viewport, margin(), true).expect("layout");
        let scales = ScaleSet::from_rows(&rows(), layout, 10, true)
            .expect("ok")
            .expect("scales");
        let theme = ThemeConfig::default();
        let selection = SelectionState::default();
        let ctx = FrameContext {
            viewport,
            margin: margin(),
            layout,
            theme: &theme,
            selection: &selection,
            x_tick_count: 10,
            y_tick_count: 10,
        };

        let brush = BrushExtent {
            lo: 0.0,
            hi: layout.inner_width / 2.0,
        };
        let mut chart = LineChart::new();
        let (_, overview) = chart.join(&rows(), &scales, &ctx, Some(brush)).expect("join");
        let plan = overview.expect("overview plan");
        let opacities: Vec<f64> = plan.enter.iter().map(|t| t.to.opacity).collect();
        assert!(opacities.contains(&1.0));
        assert!(opacities.contains(&OVERVIEW_DIM_OPACITY));
    }
}
