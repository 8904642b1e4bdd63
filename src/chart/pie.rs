//! Pie chart: a donut whose slices sweep proportionally to the first
//! measure, rotatable with the wheel.

use std::f64::consts::TAU;

use crate::chart::{FrameContext, percentile_color_domain};
use crate::core::{DataPoint, Identity, Point};
use crate::error::{ChartError, ChartResult};
use crate::join::MarkAttrs;
use crate::render::{
    ArcPrimitive, LinePrimitive, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive,
};
use crate::select::resolve_highlight;

/// Inner radius as a fraction of the outer radius.
const HOLE_RATIO: f64 = 0.7;
/// Angular gap between adjacent slices, in radians.
const PAD_ANGLE: f64 = 0.01;
/// Rotation applied per wheel notch, in radians.
const WHEEL_ROTATION_STEP: f64 = 0.1;
/// Slice labels are suppressed once their anchor drifts this close to the
/// vertical extremes, where they would collide with neighbors.
const LABEL_SUPPRESS_RATIO: f64 = 0.70;
/// Unselected slices sit slightly brighter than cartesian marks.
const UNSELECTED_SLICE_OPACITY: f64 = 0.8;
/// Slices draw at this fraction of the full radius; labels and their
/// leader lines occupy the ring left outside.
const SLICE_RADIUS_SCALE: f64 = 0.68;
/// Leader lines run between these fractions of the label anchor radius.
const LEADER_LINE_RATIOS: (f64, f64) = (0.83, 0.95);

#[derive(Debug, Clone, PartialEq)]
struct Slice {
    identity: Identity,
    arc: ArcPrimitive,
    label: String,
    label_anchor: Point,
    label_suppressed: bool,
    leader: (Point, Point),
}

pub struct PieChart {
    rotation: f64,
    slices: Vec<Slice>,
}

impl Default for PieChart {
    fn default() -> Self {
        Self::new()
    }
}

impl PieChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rotation: 0.0,
            slices: Vec::new(),
        }
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// One wheel notch: a fixed angular step in the scroll direction.
    ///
    /// The caller also hides the tooltip, since every slice moves under
    /// the pointer.
    pub fn rotate(&mut self, wheel_delta: f64) {
        if wheel_delta != 0.0 && wheel_delta.is_finite() {
            self.rotation += WHEEL_ROTATION_STEP * wheel_delta.signum();
        }
    }

    /// Recomputes slice geometry from sorted rows at the current rotation.
    pub fn layout(&mut self, rows: &[DataPoint], ctx: &FrameContext<'_>) -> ChartResult<()> {
        let mut total = 0.0;
        for row in rows {
            let value = row.measure_value(0).unwrap_or(0.0);
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "pie slice value for row {} must be finite and >= 0",
                    row.identity
                )));
            }
            total += value;
        }
        if !rows.is_empty() && total <= 0.0 {
            return Err(ChartError::InvalidData(
                "pie requires a positive measure total".to_owned(),
            ));
        }

        // Reversed percentile domain: larger slices take the gradient's
        // dark end.
        let (lo, hi) = percentile_color_domain(rows, 0).unwrap_or((0.0, 1.0));
        let colors = ctx.theme.sequential((hi, lo));

        let cx = ctx.margin.left + ctx.layout.inner_width / 2.0;
        let cy = ctx.margin.top + ctx.layout.main_height / 2.0;
        let radius = ctx.layout.inner_width.min(ctx.layout.main_height) / 2.0;
        let outer = radius * SLICE_RADIUS_SCALE;
        let inner = outer * HOLE_RATIO;
        // Labels anchor on the full-radius ring outside the drawn slices.
        let anchor_radius = radius * (1.0 + HOLE_RATIO) / 2.0;

        self.slices.clear();
        let mut cumulative = 0.0;
        for row in rows {
            let value = row.measure_value(0).unwrap_or(0.0);
            let sweep = value / total * TAU;
            let a0 = self.rotation + cumulative;
            let a1 = a0 + sweep;
            cumulative += sweep;

            // Half the pad on each side, never inverting thin slices.
            let pad = (PAD_ANGLE / 2.0).min(sweep / 2.0);
            let highlight = resolve_highlight(row.identity, ctx.selection, ctx.theme);
            let arc = ArcPrimitive {
                cx,
                cy,
                start_angle: a0 + pad,
                end_angle: a1 - pad,
                inner_radius: inner,
                outer_radius: outer,
                fill: colors.color_at(value),
                opacity: if ctx.selection.contains(row.identity) {
                    1.0
                } else {
                    UNSELECTED_SLICE_OPACITY
                },
                stroke: highlight.stroke,
            };

            let label_anchor = anchor_at(&arc, anchor_radius);
            self.slices.push(Slice {
                identity: row.identity,
                arc,
                label: row
                    .primary_dimension()
                    .map(|value| value.display())
                    .unwrap_or_default(),
                label_anchor,
                label_suppressed: (label_anchor.y - cy).abs() >= radius * LABEL_SUPPRESS_RATIO,
                leader: (
                    anchor_at(&arc, anchor_radius * LEADER_LINE_RATIOS.0),
                    anchor_at(&arc, anchor_radius * LEADER_LINE_RATIOS.1),
                ),
            });
        }
        Ok(())
    }

    pub fn frame(&self, ctx: &FrameContext<'_>) -> ChartResult<RenderFrame> {
        let mut frame = RenderFrame::new(ctx.viewport);
        frame.rects.push(RectPrimitive {
            x: 0.0,
            y: 0.0,
            width: f64::from(ctx.viewport.width),
            height: f64::from(ctx.viewport.height),
            fill: ctx.theme.background_color,
        });

        let text = ctx.theme.axis_text;
        for slice in &self.slices {
            frame.arcs.push(slice.arc);
            if !slice.label_suppressed && !slice.label.is_empty() {
                let halign = if slice.label_anchor.x > slice.arc.cx {
                    TextHAlign::Left
                } else {
                    TextHAlign::Right
                };
                frame.texts.push(TextPrimitive::new(
                    slice.label.clone(),
                    slice.label_anchor.x,
                    slice.label_anchor.y,
                    text.font_size_px,
                    text.color,
                    halign,
                ));
                frame.lines.push(LinePrimitive {
                    x1: slice.leader.0.x,
                    y1: slice.leader.0.y,
                    x2: slice.leader.1.x,
                    y2: slice.leader.1.y,
                    stroke_width: 0.8,
                    color: text.color,
                });
            }
        }

        frame.validate()?;
        Ok(frame)
    }

    /// Slice anchor points (arc centroids), for hover hit testing.
    #[must_use]
    pub fn mark_positions(&self) -> Vec<(Identity, Point)> {
        self.slices
            .iter()
            .map(|slice| {
                let (x, y) = slice.arc.centroid();
                (slice.identity, Point::new(x, y))
            })
            .collect()
    }

    /// Hover attrs for one slice, synthesized from its committed arc.
    #[must_use]
    pub fn mark_attrs(&self, identity: Identity) -> Option<MarkAttrs> {
        self.slices
            .iter()
            .find(|slice| slice.identity == identity)
            .map(|slice| {
                let (x, y) = slice.arc.centroid();
                MarkAttrs {
                    x,
                    y,
                    radius: slice.arc.outer_radius,
                    opacity: slice.arc.opacity,
                    fill: slice.arc.fill,
                    stroke: slice.arc.stroke,
                    stroke_width: 1.0,
                }
            })
    }

    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }
}

/// Point at `radius` along a slice's mid-angle, with zero at 12 o'clock.
fn anchor_at(arc: &ArcPrimitive, radius: f64) -> Point {
    let angle = (arc.start_angle + arc.end_angle) / 2.0 - std::f64::consts::FRAC_PI_2;
    Point::new(arc.cx + radius * angle.cos(), arc.cy + radius * angle.sin())
}
