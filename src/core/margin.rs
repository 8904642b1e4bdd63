use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{DataPoint, Viewport};

/// Pixel margins around the plot area.
///
/// `middle` separates the main plot from the overview strip and only exists
/// for charts carrying one; it is derived from the measured width of the
/// longest dimension label rendered at a 45-degree tilt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    pub middle: f64,
}

impl Margin {
    #[must_use]
    pub fn horizontal(self) -> f64 {
        self.left + self.right
    }
}

/// Black-box `string -> pixel width` metric provider.
///
/// Real hosts measure through their text stack; tests supply a deterministic
/// stand-in.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_size_px: f64, font_family: &str) -> f64;
}

/// Fixed advance-width measurer for headless use.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    pub advance_ratio: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, font_size_px: f64, _font_family: &str) -> f64 {
        text.chars().count() as f64 * font_size_px * self.advance_ratio
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MarginInputs {
    longest_label: String,
    font_size_px: f64,
    font_family: String,
    width: u32,
    height: u32,
    has_x_label: bool,
    has_y_label: bool,
}

/// Computes plot margins, memoizing the expensive text measurement.
///
/// The measurement reruns only when its declared inputs (data's longest
/// label, theme font metrics, viewport size, axis labels) change; pointer
/// interactions never touch it.
#[derive(Debug, Default)]
pub struct MarginResolver {
    cached: Option<(MarginInputs, Margin)>,
    measurements: usize,
}

impl MarginResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the text measurer has actually been invoked.
    #[must_use]
    pub fn measurements_performed(&self) -> usize {
        self.measurements
    }

    pub fn resolve(
        &mut self,
        rows: &[DataPoint],
        viewport: Viewport,
        font_size_px: f64,
        font_family: &str,
        has_x_label: bool,
        has_y_label: bool,
        measurer: &dyn TextMeasurer,
    ) -> Margin {
        let longest_label = rows
            .iter()
            .filter_map(|row| row.primary_dimension())
            .map(|value| value.display())
            .max_by_key(String::len)
            .unwrap_or_default();

        let inputs = MarginInputs {
            longest_label,
            font_size_px,
            font_family: font_family.to_owned(),
            width: viewport.width,
            height: viewport.height,
            has_x_label,
            has_y_label,
        };

        if let Some((cached_inputs, margin)) = &self.cached
            && *cached_inputs == inputs
        {
            return *margin;
        }

        debug!(
            label = %inputs.longest_label,
            width = viewport.width,
            "recomputing chart margins"
        );

        let label_width =
            measurer.measure(&inputs.longest_label, font_size_px, &inputs.font_family);
        self.measurements += 1;

        // Labels tilt 45 degrees, so the vertical footprint is the width
        // projected onto the diagonal.
        let projected = (label_width * label_width / 2.0).sqrt();
        let middle = projected + if has_x_label { 60.0 } else { 20.0 };

        let width = f64::from(viewport.width);
        let (left, right) = if has_y_label {
            (
                (width * 0.10).clamp(80.0, 130.0),
                (width * 0.07).clamp(40.0, 80.0),
            )
        } else {
            (
                (width * 0.05).clamp(30.0, 60.0),
                (width * 0.05).clamp(30.0, 60.0),
            )
        };

        let margin = Margin {
            top: 30.0,
            right,
            bottom: 20.0,
            left,
            middle,
        };
        self.cached = Some((inputs, margin));
        margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DimensionCell, Identity, MeasureCell};

    fn row(id: u64, label: &str) -> DataPoint {
        DataPoint::new(
            Identity(id),
            [DimensionCell::text("Month", label)],
            [MeasureCell::new("Sales", 1.0)],
        )
    }

    #[test]
    fn unchanged_inputs_hit_the_cache() {
        let rows = vec![row(1, "January"), row(2, "May")];
        let viewport = Viewport::new(800, 600);
        let mut resolver = MarginResolver::new();
        let measurer = MonospaceMeasurer::default();

        let first = resolver.resolve(&rows, viewport, 12.0, "sans", true, true, &measurer);
        let second = resolver.resolve(&rows, viewport, 12.0, "sans", true, true, &measurer);

        assert_eq!(first, second);
        assert_eq!(resolver.measurements_performed(), 1);
    }

    #[test]
    fn size_change_invalidates_the_cache() {
        let rows = vec![row(1, "January")];
        let mut resolver = MarginResolver::new();
        let measurer = MonospaceMeasurer::default();

        resolver.resolve(&rows, Viewport::new(800, 600), 12.0, "sans", true, true, &measurer);
        resolver.resolve(&rows, Viewport::new(900, 600), 12.0, "sans", true, true, &measurer);

        assert_eq!(resolver.measurements_performed(), 2);
    }

    #[test]
    fn left_margin_reserves_space_for_y_label() {
        let rows = vec![row(1, "x")];
        let viewport = Viewport::new(1000, 600);
        let measurer = MonospaceMeasurer::default();

        let mut with_label = MarginResolver::new();
        let labeled = with_label.resolve(&rows, viewport, 12.0, "sans", false, true, &measurer);

        let mut without_label = MarginResolver::new();
        let unlabeled = without_label.resolve(&rows, viewport, 12.0, "sans", false, false, &measurer);

        assert!(labeled.left > unlabeled.left);
    }
}
