use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::scale::LinearScale;
use crate::error::{ChartError, ChartResult};

/// Continuous scale+translate over the main plot's x range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub scale: f64,
    pub translate_x: f64,
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate_x: 0.0,
    };

    #[must_use]
    pub fn apply_x(self, x: f64) -> f64 {
        x * self.scale + self.translate_x
    }

    #[must_use]
    pub fn invert_x(self, pixel: f64) -> f64 {
        (pixel - self.translate_x) / self.scale
    }
}

/// Brush selection in overview pixel space, `lo < hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushExtent {
    pub lo: f64,
    pub hi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 8.0,
        }
    }
}

/// Who initiated a window-mutation request.
///
/// The synchronizer forwards each user gesture to the opposite
/// representation internally; the source tag is how a handler recognizes
/// (and short-circuits) the synthetic move it itself caused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureSource {
    Zoom,
    Brush,
    Program,
}

/// Result of one gesture: either a single window update to render, or a
/// short-circuited re-entrant event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Apply `main_range` to the x scale and redraw once.
    Applied(WindowUpdate),
    /// Re-entrant echo of a synthetic move; no recompute, no render.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowUpdate {
    /// New pixel range for the main x scale (domain untouched).
    pub main_range: (f64, f64),
    /// Matching brush selection in overview pixels.
    pub brush_extent: BrushExtent,
}

/// Owns the shared horizontal window and mediates between the zoom gesture
/// on the main plot and the brush gesture on the overview strip.
///
/// Both gestures set the same window; each applied gesture updates both
/// representations in the same step so no rendered frame ever observes them
/// disagreeing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSync {
    width: f64,
    limits: ZoomLimits,
    zoom: ZoomTransform,
    brush: BrushExtent,
    gestures_applied: usize,
}

impl ViewportSync {
    pub fn new(width: f64, limits: ZoomLimits) -> ChartResult<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(ChartError::InvalidData(
                "viewport sync width must be finite and > 0".to_owned(),
            ));
        }
        if limits.min_scale < 1.0 || limits.max_scale < limits.min_scale {
            return Err(ChartError::InvalidConfig(
                "zoom limits must satisfy 1 <= min <= max".to_owned(),
            ));
        }

        Ok(Self {
            width,
            limits,
            zoom: ZoomTransform::IDENTITY,
            brush: BrushExtent { lo: 0.0, hi: width },
            gestures_applied: 0,
        })
    }

    #[must_use]
    pub fn zoom_transform(&self) -> ZoomTransform {
        self.zoom
    }

    #[must_use]
    pub fn brush_extent(&self) -> BrushExtent {
        self.brush
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Number of gestures that produced a window update. Each one maps to
    /// exactly one domain recompute and one mark re-render.
    #[must_use]
    pub fn gestures_applied(&self) -> usize {
        self.gestures_applied
    }

    /// Current main-plot pixel range implied by the zoom transform.
    #[must_use]
    pub fn main_range(&self) -> (f64, f64) {
        (self.zoom.apply_x(0.0), self.zoom.apply_x(self.width))
    }

    /// Zoom gesture: continuous scale+translate over the main plot.
    ///
    /// Events originating from a brush callback are this synchronizer's own
    /// synthetic echo and are dropped before touching any state.
    pub fn on_zoom(
        &mut self,
        source: GestureSource,
        scale: f64,
        translate_x: f64,
    ) -> ChartResult<SyncOutcome> {
        if source == GestureSource::Brush {
            debug!("short-circuiting re-entrant zoom event from brush sync");
            return Ok(SyncOutcome::Ignored);
        }
        if !scale.is_finite() || !translate_x.is_finite() {
            return Err(ChartError::Gesture(
                "zoom transform must be finite".to_owned(),
            ));
        }

        let scale = scale.clamp(self.limits.min_scale, self.limits.max_scale);
        // Translate extent bounds the pannable area to [0, width]:
        // invert(0) >= 0 and invert(width) <= width.
        let translate_x = translate_x.clamp(self.width * (1.0 - scale), 0.0);

        self.zoom = ZoomTransform { scale, translate_x };
        // The matching brush move, tagged as zoom-sourced so the brush
        // handler never feeds it back.
        self.brush = BrushExtent {
            lo: self.zoom.invert_x(0.0).max(0.0),
            hi: self.zoom.invert_x(self.width).min(self.width),
        };
        self.gestures_applied += 1;

        Ok(SyncOutcome::Applied(WindowUpdate {
            main_range: self.main_range(),
            brush_extent: self.brush,
        }))
    }

    /// Brush gesture: range selection in overview pixel space.
    ///
    /// Recomputes the main range from the selection inverted through the
    /// zoom representation; events echoed from a zoom callback are dropped.
    pub fn on_brush(&mut self, source: GestureSource, lo: f64, hi: f64) -> ChartResult<SyncOutcome> {
        if source == GestureSource::Zoom {
            debug!("short-circuiting re-entrant brush event from zoom sync");
            return Ok(SyncOutcome::Ignored);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return Err(ChartError::Gesture("brush extent must be finite".to_owned()));
        }

        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let lo = lo.clamp(0.0, self.width);
        let hi = hi.clamp(0.0, self.width);
        if hi - lo <= f64::EPSILON {
            return Err(ChartError::Gesture(
                "degenerate brush selection".to_owned(),
            ));
        }

        // A selection narrower than the zoom limits allow widens to the
        // closest representable window; the stored extent always reflects
        // the clamped transform, never the raw gesture.
        let scale = (self.width / (hi - lo)).clamp(self.limits.min_scale, self.limits.max_scale);
        let translate_x = (-lo * scale).clamp(self.width * (1.0 - scale), 0.0);
        self.zoom = ZoomTransform { scale, translate_x };
        self.brush = BrushExtent {
            lo: self.zoom.invert_x(0.0).max(0.0),
            hi: self.zoom.invert_x(self.width).min(self.width),
        };
        self.gestures_applied += 1;

        Ok(SyncOutcome::Applied(WindowUpdate {
            main_range: self.main_range(),
            brush_extent: self.brush,
        }))
    }

    /// Programmatic fit on data/size change.
    ///
    /// When the computed fit level differs from the current zoom, issues a
    /// zoom to that level anchored at the origin; the brush follows through
    /// the usual zoom path.
    pub fn auto_fit(&mut self, fit_scale: f64) -> ChartResult<SyncOutcome> {
        if (self.zoom.scale - fit_scale).abs() <= 1e-9 {
            return Ok(SyncOutcome::Ignored);
        }
        self.on_zoom(GestureSource::Program, fit_scale, 0.0)
    }

    /// Resizes the pannable area, rescaling both representations.
    pub fn set_width(&mut self, width: f64) -> ChartResult<()> {
        if !width.is_finite() || width <= 0.0 {
            return Err(ChartError::InvalidData(
                "viewport sync width must be finite and > 0".to_owned(),
            ));
        }
        let ratio = width / self.width;
        self.width = width;
        self.zoom.translate_x *= ratio;
        self.brush.lo *= ratio;
        self.brush.hi *= ratio;
        Ok(())
    }

    /// Applies the current window to the x scale's range. The scale's
    /// domain is never touched by gesture handling.
    pub fn apply_to_scale(&self, x: &mut LinearScale) -> ChartResult<()> {
        x.set_range(self.main_range())
    }

    /// Checks the two representations describe the same visible window.
    #[must_use]
    pub fn representations_agree(&self, tolerance: f64) -> bool {
        let lo = self.zoom.invert_x(0.0).max(0.0);
        let hi = self.zoom.invert_x(self.width).min(self.width);
        (lo - self.brush.lo).abs() <= tolerance && (hi - self.brush.hi).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync() -> ViewportSync {
        ViewportSync::new(1000.0, ZoomLimits::default()).expect("sync")
    }

    #[test]
    fn zoom_updates_brush_in_same_step() {
        let mut sync = sync();
        let outcome = sync
            .on_zoom(GestureSource::Zoom, 2.0, -500.0)
            .expect("zoom");
        assert!(matches!(outcome, SyncOutcome::Applied(_)));
        assert!(sync.representations_agree(1e-9));

        let brush = sync.brush_extent();
        assert!((brush.lo - 250.0).abs() < 1e-9);
        assert!((brush.hi - 750.0).abs() < 1e-9);
    }

    #[test]
    fn re_entrant_events_are_short_circuited() {
        let mut sync = sync();
        sync.on_zoom(GestureSource::Zoom, 2.0, -100.0).expect("zoom");
        let before = sync.gestures_applied();

        let echo = sync
            .on_brush(GestureSource::Zoom, 100.0, 600.0)
            .expect("echo");
        assert_eq!(echo, SyncOutcome::Ignored);
        assert_eq!(sync.gestures_applied(), before);

        let echo = sync.on_zoom(GestureSource::Brush, 4.0, 0.0).expect("echo");
        assert_eq!(echo, SyncOutcome::Ignored);
        assert_eq!(sync.gestures_applied(), before);
    }

    #[test]
    fn zoom_is_clamped_to_limits_and_pannable_area() {
        let mut sync = sync();
        sync.on_zoom(GestureSource::Zoom, 50.0, 500.0).expect("zoom");
        let zoom = sync.zoom_transform();
        assert_eq!(zoom.scale, 8.0);
        assert_eq!(zoom.translate_x, 0.0);

        sync.on_zoom(GestureSource::Zoom, 2.0, -99_999.0).expect("zoom");
        assert_eq!(sync.zoom_transform().translate_x, 1000.0 * (1.0 - 2.0));
    }

    #[test]
    fn degenerate_brush_is_a_gesture_fault_leaving_state_intact() {
        let mut sync = sync();
        sync.on_zoom(GestureSource::Zoom, 2.0, -500.0).expect("zoom");
        let before = sync;

        let result = sync.on_brush(GestureSource::Brush, 300.0, 300.0);
        assert!(result.is_err());
        assert_eq!(sync, before);
    }

    #[test]
    fn auto_fit_is_idempotent_at_the_fit_level() {
        let mut sync = sync();
        assert!(matches!(
            sync.auto_fit(3.0).expect("fit"),
            SyncOutcome::Applied(_)
        ));
        assert_eq!(sync.auto_fit(3.0).expect("fit"), SyncOutcome::Ignored);
    }
}
