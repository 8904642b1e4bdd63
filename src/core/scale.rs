use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Continuous `domain -> pixel` mapping with an explicit pixel range.
///
/// The range is owned by the scale because pointer-driven gestures (zoom,
/// brush) shift the visible window by remapping the range while the domain
/// stays pinned to the data extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() || domain.0 == domain.1 {
            return Err(ChartError::InvalidData(
                "scale domain must be finite with non-zero span".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Remaps the pixel range without touching the domain.
    ///
    /// This is the only mutation pointer gestures are allowed to perform.
    pub fn set_range(&mut self, range: (f64, f64)) -> ChartResult<()> {
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }
        self.range_start = range.0;
        self.range_end = range.1;
        Ok(())
    }

    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    pub fn invert(self, pixel: f64) -> ChartResult<f64> {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return Err(ChartError::InvalidData(
                "cannot invert a scale with zero-width range".to_owned(),
            ));
        }
        let normalized = (pixel - self.range_start) / span;
        Ok(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }

    /// Rounds the domain outward to nice tick boundaries.
    pub fn nice(&mut self, tick_count: usize) {
        let (start, stop) = ordered(self.domain_start, self.domain_end);
        let reversed = self.domain_start > self.domain_end;

        let mut lo = start;
        let mut hi = stop;
        // Two passes, matching the d3 fixed point on the tick step.
        for _ in 0..2 {
            let step = tick_step(lo, hi, tick_count);
            if step <= 0.0 || !step.is_finite() {
                break;
            }
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        }

        if reversed {
            self.domain_start = hi;
            self.domain_end = lo;
        } else {
            self.domain_start = lo;
            self.domain_end = hi;
        }
    }

    /// Tick positions over the current domain using the 1/2/5 ladder.
    #[must_use]
    pub fn ticks(self, tick_count: usize) -> Vec<f64> {
        let (start, stop) = ordered(self.domain_start, self.domain_end);
        let step = tick_step(start, stop, tick_count);
        if step <= 0.0 || !step.is_finite() {
            return Vec::new();
        }

        let first = (start / step).ceil();
        let last = (stop / step).floor();
        let mut ticks = Vec::new();
        let mut index = first;
        while index <= last {
            ticks.push(index * step);
            index += 1.0;
        }
        ticks
    }
}

/// Widens `[x0, x1]` by `(x1 - x0) * k / 2` on each side so extreme points
/// are not clipped at the plot edge.
#[must_use]
pub fn pad_linear(extent: (f64, f64), k: f64) -> (f64, f64) {
    let delta = (extent.1 - extent.0) * k / 2.0;
    (extent.0 - delta, extent.1 + delta)
}

/// Min/max over an iterator of values, skipping non-finite entries.
#[must_use]
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values {
        if !value.is_finite() {
            continue;
        }
        min = min.min(value);
        max = max.max(value);
    }
    (min <= max).then_some((min, max))
}

/// Linear-interpolated order statistic over already-collected values.
///
/// Matches `d3.quantile`: `p` in `[0, 1]`, interpolating between adjacent
/// sorted values.
#[must_use]
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let position = (sorted.len() - 1) as f64 * p;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    let base = sorted[lower];
    let next = sorted.get(lower + 1).copied().unwrap_or(base);
    Some(base + (next - base) * fraction)
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Largest power-of-ten multiple of 1, 2, or 5 producing roughly
/// `count` intervals over `[start, stop]`.
fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let count = count.max(1) as f64;
    let raw = (stop - start) / count;
    if raw <= 0.0 || !raw.is_finite() {
        return 0.0;
    }

    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;

    let factor = if error >= 7.071 {
        10.0
    } else if error >= 3.162 {
        5.0
    } else if error >= 1.414 {
        2.0
    } else {
        1.0
    };
    base * factor
}

/// Ordinal `value -> pixel` mapping for the overview strip.
///
/// Mirrors a d3 band scale with equal inner/outer padding and centered
/// alignment. Keys are the sort keys of the rendered rows in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    keys: Vec<f64>,
    range_start: f64,
    range_end: f64,
    padding: f64,
}

impl BandScale {
    pub fn new(keys: Vec<f64>, range: (f64, f64), padding: f64) -> ChartResult<Self> {
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "band scale range must be finite".to_owned(),
            ));
        }
        if !(0.0..1.0).contains(&padding) {
            return Err(ChartError::InvalidData(
                "band scale padding must be in [0, 1)".to_owned(),
            ));
        }

        Ok(Self {
            keys,
            range_start: range.0,
            range_end: range.1,
            padding,
        })
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn step(&self) -> f64 {
        let n = self.keys.len() as f64;
        let divisor = (n - self.padding + 2.0 * self.padding).max(1.0);
        (self.range_end - self.range_start) / divisor
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Band center for a key, or `None` for keys outside the domain.
    #[must_use]
    pub fn position(&self, key: f64) -> Option<f64> {
        let index = self.keys.iter().position(|k| *k == key)?;
        let step = self.step();
        let n = self.keys.len() as f64;
        let extent = self.range_end - self.range_start;
        let start = self.range_start + (extent - step * (n - self.padding)) / 2.0;
        Some(start + step * index as f64 + self.bandwidth() / 2.0)
    }
}
