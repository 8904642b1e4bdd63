//! Data-source contract.
//!
//! Rows come from an external analytics collaborator; the engine only
//! defines the fetch window and assumes at most one in-flight fetch per
//! chart instance. Fetch failures surface as [`ChartError::Fetch`] and are
//! never retried here.

use serde::{Deserialize, Serialize};

use crate::core::DataPoint;
use crate::error::{ChartError, ChartResult};

/// Pagination window for one fetch: row/column offsets plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchQuery {
    pub top: usize,
    pub left: usize,
    pub width: usize,
    pub height: usize,
}

impl FetchQuery {
    /// Initial window: all configured columns, first 100 rows.
    #[must_use]
    pub fn initial(column_count: usize) -> Self {
        Self {
            top: 0,
            left: 0,
            width: column_count,
            height: 100,
        }
    }
}

/// Supplier of normalized rows for one chart.
pub trait DataSource {
    fn fetch_rows(&mut self, query: &FetchQuery) -> ChartResult<Vec<DataPoint>>;
}

/// Fixed in-memory source for tests and static charts.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Vec<DataPoint>,
}

impl StaticSource {
    #[must_use]
    pub fn new(rows: Vec<DataPoint>) -> Self {
        Self { rows }
    }
}

impl DataSource for StaticSource {
    fn fetch_rows(&mut self, query: &FetchQuery) -> ChartResult<Vec<DataPoint>> {
        if query.width == 0 || query.height == 0 {
            return Err(ChartError::Fetch(
                "fetch window must have non-zero extent".to_owned(),
            ));
        }
        Ok(self
            .rows
            .iter()
            .skip(query.top)
            .take(query.height)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DimensionCell, Identity, MeasureCell};

    fn rows(n: u64) -> Vec<DataPoint> {
        (0..n)
            .map(|i| {
                DataPoint::new(
                    Identity(i),
                    [DimensionCell::numeric("Day", i as f64)],
                    [MeasureCell::new("Value", i as f64 * 2.0)],
                )
            })
            .collect()
    }

    #[test]
    fn static_source_honors_the_window() {
        let mut source = StaticSource::new(rows(10));
        let page = source
            .fetch_rows(&FetchQuery {
                top: 4,
                left: 0,
                width: 2,
                height: 3,
            })
            .expect("fetch");
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].identity, Identity(4));
    }

    #[test]
    fn zero_extent_window_is_a_fetch_error() {
        let mut source = StaticSource::new(rows(3));
        let result = source.fetch_rows(&FetchQuery {
            top: 0,
            left: 0,
            width: 0,
            height: 5,
        });
        assert!(matches!(result, Err(ChartError::Fetch(_))));
    }
}
