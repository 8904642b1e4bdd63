use crate::core::{DataPoint, Identity, Point};

/// Vertical offset lifting the tooltip above the hovered mark.
const ANCHOR_OFFSET_Y: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub label: String,
    pub formatted_value: String,
}

/// Snapshot consumed by the host's floating overlay.
///
/// The engine does not clamp the anchor to the container; consumers may
/// clip at their edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TooltipState {
    pub visible: bool,
    pub anchor: Point,
    pub title: String,
    pub rows: Vec<TooltipRow>,
}

/// Tracks hover/move/leave over marks and owns the tooltip overlay state.
///
/// Tooltip state never influences data join or scales; pointer events are
/// its only mutation source.
#[derive(Debug, Default)]
pub struct TooltipController {
    state: TooltipState,
    hovered: Option<Identity>,
}

impl TooltipController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    #[must_use]
    pub fn hovered(&self) -> Option<Identity> {
        self.hovered
    }

    /// Pointer entered a mark: build the content and show the overlay.
    ///
    /// Title is the primary dimension's raw value; one row per measure,
    /// each value passed through that measure's formatter.
    pub fn on_mark_over(&mut self, row: &DataPoint, mark_position: Point) {
        self.state.title = row
            .primary_dimension()
            .map(|value| value.display())
            .unwrap_or_default();
        self.state.rows = row
            .measures
            .iter()
            .map(|measure| TooltipRow {
                label: measure.label.clone(),
                formatted_value: measure.formatted(),
            })
            .collect();
        self.state.anchor = anchor_above(mark_position);
        self.state.visible = true;
        self.hovered = Some(row.identity);
    }

    /// Pointer moved while over a mark: track it, keeping the offset.
    pub fn on_pointer_move(&mut self, mark_position: Point) {
        if self.state.visible {
            self.state.anchor = anchor_above(mark_position);
        }
    }

    /// Pointer left the mark: hide the overlay.
    ///
    /// Returns the identity whose opacity must be restored to its
    /// selection-driven value; that restoration animates independently of
    /// the (instant) tooltip hide even though one event triggers both.
    pub fn on_mark_out(&mut self) -> Option<Identity> {
        self.state.visible = false;
        self.hovered.take()
    }

    /// Hides the overlay without touching hover bookkeeping (wheel path).
    pub fn hide(&mut self) {
        self.state.visible = false;
    }
}

fn anchor_above(mark_position: Point) -> Point {
    Point::new(mark_position.x, mark_position.y - ANCHOR_OFFSET_Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DimensionCell, MeasureCell, ValueFormatter};

    fn row() -> DataPoint {
        DataPoint::new(
            Identity(3),
            [DimensionCell::text("Month", "March")],
            [
                MeasureCell::new("Sales", 1234.5)
                    .with_formatter(ValueFormatter::new(|v| format!("${v:.0}"))),
                MeasureCell::new("Margin", 0.25),
            ],
        )
    }

    #[test]
    fn hover_builds_title_and_formatted_rows() {
        let mut tooltip = TooltipController::new();
        tooltip.on_mark_over(&row(), Point::new(100.0, 200.0));

        let state = tooltip.state();
        assert!(state.visible);
        assert_eq!(state.title, "March");
        assert_eq!(state.rows.len(), 2);
        assert_eq!(state.rows[0].formatted_value, "$1235");
        assert_eq!(state.anchor, Point::new(100.0, 170.0));
    }

    #[test]
    fn move_repositions_and_leave_hides() {
        let mut tooltip = TooltipController::new();
        tooltip.on_mark_over(&row(), Point::new(100.0, 200.0));
        tooltip.on_pointer_move(Point::new(120.0, 210.0));
        assert_eq!(tooltip.state().anchor, Point::new(120.0, 180.0));

        let restore = tooltip.on_mark_out();
        assert_eq!(restore, Some(Identity(3)));
        assert!(!tooltip.state().visible);
        assert_eq!(tooltip.hovered(), None);
    }

    #[test]
    fn move_without_hover_is_inert() {
        let mut tooltip = TooltipController::new();
        tooltip.on_pointer_move(Point::new(50.0, 50.0));
        assert!(!tooltip.state().visible);
        assert_eq!(tooltip.state().anchor, Point::default());
    }
}
