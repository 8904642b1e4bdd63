use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Identity, Point};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LassoConfig {
    /// The path auto-closes when its end point is within this distance of
    /// its start point.
    pub close_distance: f64,
}

impl Default for LassoConfig {
    fn default() -> Self {
        Self {
            close_distance: 100.0,
        }
    }
}

/// Classification of currently rendered marks during an active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LassoClassification {
    /// Marks inside the gesture path so far.
    pub possible: IndexSet<Identity>,
}

/// Free-form polygon selection over rendered marks.
///
/// All state is transient: it exists only between `start` and `finish` and
/// is destroyed at gesture end. The finalized identity set is returned from
/// `finish` exactly once; committing it is the caller's concern.
#[derive(Debug, Default)]
pub struct LassoSelector {
    config: LassoConfig,
    enabled: bool,
    active: bool,
    polygon: Vec<Point>,
}

impl LassoSelector {
    #[must_use]
    pub fn new(config: LassoConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Lasso mode is mutually exclusive with the zoom gesture on the same
    /// surface; the chart disables zoom handling while this is set.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    /// Begins a gesture. Every mark starts "not possible".
    pub fn start(&mut self, origin: Point) -> ChartResult<LassoClassification> {
        if !self.enabled {
            return Err(ChartError::Gesture(
                "lasso gesture while lasso mode is disabled".to_owned(),
            ));
        }
        self.validate_point(origin)?;
        self.active = true;
        self.polygon.clear();
        self.polygon.push(origin);
        Ok(LassoClassification::default())
    }

    /// Extends the path and reclassifies every mark against it.
    pub fn extend<'a>(
        &mut self,
        point: Point,
        marks: impl IntoIterator<Item = (Identity, Point)>,
    ) -> ChartResult<LassoClassification> {
        if !self.active {
            return Err(ChartError::Gesture(
                "lasso move without an active gesture".to_owned(),
            ));
        }
        if let Err(fault) = self.validate_point(point) {
            self.reset();
            return Err(fault);
        }
        self.polygon.push(point);

        let possible = marks
            .into_iter()
            .filter(|(_, position)| point_in_polygon(*position, &self.polygon))
            .map(|(identity, _)| identity)
            .collect();
        Ok(LassoClassification { possible })
    }

    /// Ends the gesture and returns the finalized identity set.
    ///
    /// The polygon counts only when it closed: its end point must land
    /// within `close_distance` of its start. Degenerate paths select
    /// nothing. Transient state is destroyed either way.
    pub fn finish(
        &mut self,
        marks: impl IntoIterator<Item = (Identity, Point)>,
    ) -> ChartResult<IndexSet<Identity>> {
        if !self.active {
            return Err(ChartError::Gesture(
                "lasso end without an active gesture".to_owned(),
            ));
        }

        let closed = match (self.polygon.first(), self.polygon.last()) {
            (Some(first), Some(last)) => first.distance_to(*last) <= self.config.close_distance,
            _ => false,
        };

        let selected = if closed && self.polygon.len() >= 3 {
            marks
                .into_iter()
                .filter(|(_, position)| point_in_polygon(*position, &self.polygon))
                .map(|(identity, _)| identity)
                .collect()
        } else {
            debug!(
                vertices = self.polygon.len(),
                closed, "lasso path did not close, selecting nothing"
            );
            IndexSet::new()
        };

        self.reset();
        Ok(selected)
    }

    fn reset(&mut self) {
        self.active = false;
        self.polygon.clear();
    }

    fn validate_point(&self, point: Point) -> ChartResult<()> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(ChartError::Gesture(
                "lasso point must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Even-odd ray casting against the (implicitly closed) polygon.
#[must_use]
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        let crosses = (a.y > point.y) != (b.y > point.y);
        if crosses {
            let intersect_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < intersect_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_path() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(0.0, 5.0),
        ]
    }

    fn marks() -> Vec<(Identity, Point)> {
        vec![
            (Identity(1), Point::new(50.0, 50.0)),
            (Identity(2), Point::new(250.0, 50.0)),
        ]
    }

    #[test]
    fn closed_path_selects_contained_marks() {
        let mut lasso = LassoSelector::new(LassoConfig::default());
        lasso.set_enabled(true);

        let path = square_path();
        lasso.start(path[0]).expect("start");
        for point in &path[1..] {
            lasso.extend(*point, marks()).expect("extend");
        }
        let selected = lasso.finish(marks()).expect("finish");
        assert_eq!(selected.len(), 1);
        assert!(selected.contains(&Identity(1)));
        assert!(!lasso.is_active());
    }

    #[test]
    fn unclosed_path_selects_nothing() {
        let mut lasso = LassoSelector::new(LassoConfig {
            close_distance: 10.0,
        });
        lasso.set_enabled(true);
        lasso.start(Point::new(0.0, 0.0)).expect("start");
        lasso
            .extend(Point::new(500.0, 0.0), marks())
            .expect("extend");
        lasso
            .extend(Point::new(500.0, 500.0), marks())
            .expect("extend");
        let selected = lasso.finish(marks()).expect("finish");
        assert!(selected.is_empty());
    }

    #[test]
    fn degenerate_polygon_selects_nothing() {
        let mut lasso = LassoSelector::new(LassoConfig::default());
        lasso.set_enabled(true);
        lasso.start(Point::new(10.0, 10.0)).expect("start");
        let selected = lasso.finish(marks()).expect("finish");
        assert!(selected.is_empty());
    }

    #[test]
    fn gesture_while_disabled_is_a_fault() {
        let mut lasso = LassoSelector::new(LassoConfig::default());
        assert!(lasso.start(Point::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn non_finite_point_resets_the_gesture() {
        let mut lasso = LassoSelector::new(LassoConfig::default());
        lasso.set_enabled(true);
        lasso.start(Point::new(0.0, 0.0)).expect("start");
        assert!(lasso.extend(Point::new(f64::NAN, 0.0), marks()).is_err());
        assert!(!lasso.is_active());
    }
}
