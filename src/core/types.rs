use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A pixel-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Stable join key for one logical row.
///
/// Stays constant across re-fetches of the same logical entity even when the
/// row's value or position changes. Unique within one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(pub u64);

impl Identity {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One dimension cell: numeric when the source provides a number, textual
/// otherwise. Numeric cells drive positional scales; textual cells only
/// label axes and tooltips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DimensionValue {
    Number(f64),
    Text(String),
}

impl DimensionValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.parse().ok(),
        }
    }

    /// Raw display form used for tooltip titles and axis labels.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Total order: numeric cells ascending first, textual cells after,
    /// lexicographically. Used by the join engine's pre-sort.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.display().cmp(&other.display()),
        }
    }
}

/// Measure value formatter. Defaults to plain `to_string`.
#[derive(Clone)]
pub struct ValueFormatter(Arc<dyn Fn(f64) -> String + Send + Sync>);

impl ValueFormatter {
    #[must_use]
    pub fn new(format: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(format))
    }

    #[must_use]
    pub fn format(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::new(|value| value.to_string())
    }
}

impl fmt::Debug for ValueFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueFormatter")
    }
}

impl PartialEq for ValueFormatter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimensionCell {
    pub label: String,
    pub value: DimensionValue,
}

impl DimensionCell {
    #[must_use]
    pub fn new(label: impl Into<String>, value: DimensionValue) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    #[must_use]
    pub fn numeric(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, DimensionValue::Number(value))
    }

    #[must_use]
    pub fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, DimensionValue::Text(value.into()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasureCell {
    pub label: String,
    pub value: f64,
    pub formatter: ValueFormatter,
}

impl MeasureCell {
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            formatter: ValueFormatter::default(),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: ValueFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn formatted(&self) -> String {
        self.formatter.format(self.value)
    }
}

/// One normalized row bound to a chart.
///
/// Arity of `dimensions` and `measures` is fixed per chart variant and
/// validated once at chart construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub identity: Identity,
    pub dimensions: SmallVec<[DimensionCell; 2]>,
    pub measures: SmallVec<[MeasureCell; 3]>,
}

impl DataPoint {
    #[must_use]
    pub fn new(
        identity: Identity,
        dimensions: impl IntoIterator<Item = DimensionCell>,
        measures: impl IntoIterator<Item = MeasureCell>,
    ) -> Self {
        Self {
            identity,
            dimensions: dimensions.into_iter().collect(),
            measures: measures.into_iter().collect(),
        }
    }

    /// Primary dimension value, the join engine's sort key.
    #[must_use]
    pub fn primary_dimension(&self) -> Option<&DimensionValue> {
        self.dimensions.first().map(|cell| &cell.value)
    }

    #[must_use]
    pub fn measure_value(&self, index: usize) -> Option<f64> {
        self.measures.get(index).map(|cell| cell.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_sort_orders_numbers_before_text() {
        let a = DimensionValue::Number(2.0);
        let b = DimensionValue::Text("alpha".to_owned());
        assert_eq!(a.sort_cmp(&b), Ordering::Less);
        assert_eq!(b.sort_cmp(&a), Ordering::Greater);
    }

    #[test]
    fn textual_numbers_keep_numeric_interpretation() {
        let a = DimensionValue::Text("10".to_owned());
        let b = DimensionValue::Number(9.0);
        assert_eq!(a.as_f64(), Some(10.0));
        assert_eq!(a.sort_cmp(&b), Ordering::Greater);
    }

    #[test]
    fn default_formatter_is_plain_to_string() {
        let cell = MeasureCell::new("Sales", 12.5);
        assert_eq!(cell.formatted(), "12.5");
    }
}
