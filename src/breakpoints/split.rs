use std::iter;

use itertools::Itertools;

use super::BreakpointTable;
use crate::error::{Result, TreeError};
use crate::interval::Interval;

impl BreakpointTable {
    /// Splits weather type `row` on predictor column `col` at `values`.
    ///
    /// The row is replaced, in place, by `values.len() + 1` rows whose intervals on
    /// `col` partition the replaced one; every other column is copied. Split values
    /// are sorted and must lie strictly inside the replaced interval.
    pub fn split_row(&self, row: usize, col: usize, values: &[f64]) -> Result<BreakpointTable> {
        if row >= self.nrows() {
            return Err(TreeError::malformed(
                row,
                format!("table has only {} rows", self.nrows()),
            ));
        }
        if col >= self.ncols() {
            return Err(TreeError::malformed(
                row,
                format!("table has only {} predictor columns", self.ncols()),
            ));
        }

        let source = self.row(row);
        let bound = source[col];
        let mut splits = values.to_vec();
        splits.sort_by(f64::total_cmp);
        if let Some(&bad) = splits
            .iter()
            .find(|&&v| v.is_nan() || v <= bound.low || v >= bound.high)
        {
            return Err(TreeError::malformed(
                row,
                format!(
                    "split value {bad} is not inside {bound} of {}",
                    self.predictors()[col]
                ),
            ));
        }
        if splits.windows(2).any(|w| w[0] == w[1]) {
            return Err(TreeError::malformed(row, "repeated split value"));
        }

        let pieces: Vec<Vec<Interval>> = iter::once(bound.low)
            .chain(splits)
            .chain(iter::once(bound.high))
            .tuple_windows()
            .map(|(low, high)| {
                let mut new_row = source.clone();
                new_row[col] = Interval { low, high };
                new_row
            })
            .collect();

        let mut rows = self.rows();
        rows.splice(row..=row, pieces);
        BreakpointTable::from_rows(self.predictors().to_vec(), &rows)
    }
}
