use ndarray::{Array2, ArrayView2};

use crate::error::{Result, TreeError};
use crate::interval::Interval;

mod csv_io;
mod sparse;
mod split;

#[cfg(test)]
mod tests;

pub use csv_io::{read_sparse_csv, HIGH_SUFFIX, LOW_SUFFIX};
pub use sparse::{SparseCell, SparseTable};

/// A fully populated breakpoint table.
///
/// Row `r` describes one leaf path: for every predictor column `c` the interval
/// `[low[(r, c)], high[(r, c)])`. Columns follow the predictor order.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    predictors: Vec<String>,
    low: Array2<f64>,
    high: Array2<f64>,
}

impl BreakpointTable {
    /// Creates a dense table from separate low and high bound matrices.
    pub fn new(predictors: Vec<String>, low: Array2<f64>, high: Array2<f64>) -> Result<Self> {
        if low.dim() != high.dim() {
            return Err(TreeError::malformed(
                0,
                format!(
                    "low bounds have shape {:?} but high bounds have shape {:?}",
                    low.dim(),
                    high.dim()
                ),
            ));
        }
        if low.ncols() != predictors.len() {
            return Err(TreeError::malformed(
                0,
                format!(
                    "{} bound columns for {} predictors",
                    low.ncols(),
                    predictors.len()
                ),
            ));
        }
        for ((row, col), &lo) in low.indexed_iter() {
            Interval::new(lo, high[(row, col)]).map_err(|reason| {
                TreeError::malformed(row, format!("{}: {}", predictors[col], reason))
            })?;
        }
        Ok(Self {
            predictors,
            low,
            high,
        })
    }

    /// Creates a dense table from rows of intervals, one interval per predictor.
    pub fn from_rows(predictors: Vec<String>, rows: &[Vec<Interval>]) -> Result<Self> {
        let ncols = predictors.len();
        let mut low = Array2::zeros((rows.len(), ncols));
        let mut high = Array2::zeros((rows.len(), ncols));
        for (r, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(TreeError::malformed(
                    r,
                    format!("{} cells for {} predictors", row.len(), ncols),
                ));
            }
            for (c, interval) in row.iter().enumerate() {
                low[(r, c)] = interval.low;
                high[(r, c)] = interval.high;
            }
        }
        Self::new(predictors, low, high)
    }

    pub fn predictors(&self) -> &[String] {
        &self.predictors
    }

    pub fn nrows(&self) -> usize {
        self.low.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.low.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    pub fn low(&self) -> ArrayView2<'_, f64> {
        self.low.view()
    }

    pub fn high(&self) -> ArrayView2<'_, f64> {
        self.high.view()
    }

    #[inline]
    pub fn interval(&self, row: usize, col: usize) -> Interval {
        Interval {
            low: self.low[(row, col)],
            high: self.high[(row, col)],
        }
    }

    pub fn row(&self, row: usize) -> Vec<Interval> {
        (0..self.ncols()).map(|col| self.interval(row, col)).collect()
    }

    pub fn rows(&self) -> Vec<Vec<Interval>> {
        (0..self.nrows()).map(|row| self.row(row)).collect()
    }

    pub fn column_index(&self, predictor: &str) -> Option<usize> {
        self.predictors.iter().position(|p| p == predictor)
    }
}
