use itertools::Itertools;
use tracing::debug;

use super::BreakpointTable;
use crate::error::{Result, TreeError};
use crate::interval::Interval;
use crate::tree::MAX_BRANCHES;

/// One cell of a sparse table: `None` inherits the value of the row above.
pub type SparseCell = Option<(f64, f64)>;

/// A breakpoint table in which blank cells repeat the cell above them.
///
/// Each column, once filled, lists the bins of its predictor from top to bottom;
/// a run of identical cells names a single bin.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseTable {
    predictors: Vec<String>,
    rows: Vec<Vec<SparseCell>>,
}

impl SparseTable {
    pub fn new(predictors: Vec<String>, rows: Vec<Vec<SparseCell>>) -> Self {
        Self { predictors, rows }
    }

    pub fn predictors(&self) -> &[String] {
        &self.predictors
    }

    pub fn rows(&self) -> &[Vec<SparseCell>] {
        &self.rows
    }

    /// True when no cell needs to be inherited.
    pub fn is_dense(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_some)
    }

    /// Forward-fills every column from the row above, validating each explicit cell.
    fn filled_columns(&self) -> Result<Vec<Vec<Interval>>> {
        let ncols = self.predictors.len();
        let mut columns: Vec<Vec<Interval>> = vec![Vec::with_capacity(self.rows.len()); ncols];

        for (r, row) in self.rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(TreeError::malformed(
                    r,
                    format!("{} cells for {} predictors", row.len(), ncols),
                ));
            }
            for (c, cell) in row.iter().enumerate() {
                let interval = match *cell {
                    Some((lo, hi)) => Interval::new(lo, hi).map_err(|reason| {
                        TreeError::malformed(r, format!("{}: {}", self.predictors[c], reason))
                    })?,
                    None => *columns[c].last().ok_or_else(|| {
                        TreeError::malformed(
                            r,
                            format!("no bounds for {} to inherit", self.predictors[c]),
                        )
                    })?,
                };
                columns[c].push(interval);
            }
        }
        Ok(columns)
    }

    /// Expands the table into one dense row per combination of bins.
    ///
    /// Every column is forward-filled and its runs collapsed into the predictor's
    /// bin list; the dense rows are the product of these lists with the first
    /// column varying slowest. Bins keep the order in which they are listed.
    ///
    /// A bin list must not repeat a bin or hold more than [`MAX_BRANCHES`] bins.
    /// Dense tables break both rules and belong to [`SparseTable::into_dense`].
    pub fn expand(&self) -> Result<BreakpointTable> {
        if self.rows.is_empty() {
            return Err(TreeError::malformed(0, "breakpoint table has no rows"));
        }
        let bins = self
            .filled_columns()?
            .iter()
            .enumerate()
            .map(|(c, column)| self.bin_list(c, column))
            .collect::<Result<Vec<Vec<Interval>>>>()?;

        let dense_rows = bins
            .iter()
            .try_fold(1usize, |n, column| n.checked_mul(column.len()))
            .ok_or_else(|| {
                TreeError::malformed(0, format!("sparse table expands past {} rows", usize::MAX))
            })?;
        debug!(sparse_rows = self.rows.len(), dense_rows, "expanding sparse breakpoints");

        let rows: Vec<Vec<Interval>> = bins.into_iter().multi_cartesian_product().collect();
        BreakpointTable::from_rows(self.predictors.clone(), &rows)
    }

    /// Collapses the runs of one filled column into its bin list.
    fn bin_list(&self, col: usize, column: &[Interval]) -> Result<Vec<Interval>> {
        let name = &self.predictors[col];
        let mut bins: Vec<Interval> = Vec::new();
        for (r, &interval) in column.iter().enumerate() {
            if bins.last() == Some(&interval) {
                continue;
            }
            if bins.contains(&interval) {
                return Err(TreeError::malformed(
                    r,
                    format!(
                        "{name} lists {interval} twice; a dense table needs \"sparse\": false"
                    ),
                ));
            }
            if bins.len() == MAX_BRANCHES {
                return Err(TreeError::malformed(
                    r,
                    format!(
                        "{name} lists more than {MAX_BRANCHES} bins; \
                         a dense table needs \"sparse\": false"
                    ),
                ));
            }
            bins.push(interval);
        }
        Ok(bins)
    }

    /// Converts a table that is expected to be dense already, row for row.
    pub fn into_dense(self) -> Result<BreakpointTable> {
        if let Some(r) = self
            .rows
            .iter()
            .position(|row| row.iter().any(Option::is_none))
        {
            return Err(TreeError::malformed(r, "blank cell in a dense table"));
        }
        let columns = self.filled_columns()?;
        let rows: Vec<Vec<Interval>> = (0..self.rows.len())
            .map(|r| columns.iter().map(|column| column[r]).collect())
            .collect();
        BreakpointTable::from_rows(self.predictors, &rows)
    }
}
