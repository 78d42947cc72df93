use std::io;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use super::{BreakpointTable, SparseCell, SparseTable};
use crate::error::{Result, TreeError};
use crate::interval::parse_bound;
use crate::tree::Code;

pub const LOW_SUFFIX: &str = "_thrL";
pub const HIGH_SUFFIX: &str = "_thrH";

/// Reads a breakpoint table with `<name>_thrL,<name>_thrH` column pairs.
///
/// Columns without a threshold suffix (a code column, for instance) are ignored.
/// Blank cells are kept blank; call [`SparseTable::expand`] to fill them.
pub fn read_sparse_csv<R: io::Read>(reader: R) -> Result<SparseTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let (predictors, columns) = threshold_columns(&headers)?;

    let mut rows = Vec::new();
    for (r, result) in rdr.records().enumerate() {
        let record = result?;
        let row = columns
            .iter()
            .map(|&(lo, hi)| parse_cell(r, &record[lo], &record[hi]))
            .collect::<Result<Vec<SparseCell>>>()?;
        rows.push(row);
    }

    Ok(SparseTable::new(predictors, rows))
}

fn threshold_columns(headers: &StringRecord) -> Result<(Vec<String>, Vec<(usize, usize)>)> {
    let mut predictors = Vec::new();
    let mut columns = Vec::new();
    let mut pending_low: Option<(String, usize)> = None;

    for (i, header) in headers.iter().enumerate() {
        if let Some(name) = header.strip_suffix(LOW_SUFFIX) {
            if let Some((open, _)) = &pending_low {
                return Err(TreeError::malformed(
                    0,
                    format!("column {open}{LOW_SUFFIX} has no matching {HIGH_SUFFIX} column"),
                ));
            }
            pending_low = Some((name.to_string(), i));
        } else if let Some(name) = header.strip_suffix(HIGH_SUFFIX) {
            match pending_low.take() {
                Some((low_name, lo)) if low_name == name => {
                    predictors.push(low_name);
                    columns.push((lo, i));
                }
                _ => {
                    return Err(TreeError::malformed(
                        0,
                        format!("column {header} does not follow {name}{LOW_SUFFIX}"),
                    ))
                }
            }
        }
    }
    if let Some((open, _)) = &pending_low {
        return Err(TreeError::malformed(
            0,
            format!("column {open}{LOW_SUFFIX} has no matching {HIGH_SUFFIX} column"),
        ));
    }
    if predictors.is_empty() {
        return Err(TreeError::malformed(0, "no threshold columns in header"));
    }
    Ok((predictors, columns))
}

fn parse_cell(row: usize, low: &str, high: &str) -> Result<SparseCell> {
    match (low.is_empty(), high.is_empty()) {
        (true, true) => Ok(None),
        (false, false) => {
            let lo = parse_bound(low).map_err(|reason| TreeError::malformed(row, reason))?;
            let hi = parse_bound(high).map_err(|reason| TreeError::malformed(row, reason))?;
            Ok(Some((lo, hi)))
        }
        _ => Err(TreeError::malformed(
            row,
            format!("half-filled bound pair ({low:?}, {high:?})"),
        )),
    }
}

impl BreakpointTable {
    /// Reads a CSV table whose blank cells inherit from the row above.
    pub fn from_sparse_csv<R: io::Read>(reader: R) -> Result<Self> {
        read_sparse_csv(reader)?.expand()
    }

    /// Reads a CSV table that must not contain blank cells.
    pub fn from_dense_csv<R: io::Read>(reader: R) -> Result<Self> {
        read_sparse_csv(reader)?.into_dense()
    }

    /// Writes the table as CSV, optionally prefixed by a code column.
    pub fn write_csv<W: io::Write>(&self, writer: W, codes: Option<&[Code]>) -> Result<()> {
        if let Some(codes) = codes {
            if codes.len() != self.nrows() {
                return Err(TreeError::malformed(
                    0,
                    format!("{} codes for {} rows", codes.len(), self.nrows()),
                ));
            }
        }

        let mut wtr = WriterBuilder::new().from_writer(writer);
        let mut header = Vec::with_capacity(2 * self.ncols() + 1);
        if codes.is_some() {
            header.push("WT code".to_string());
        }
        for name in self.predictors() {
            header.push(format!("{name}{LOW_SUFFIX}"));
            header.push(format!("{name}{HIGH_SUFFIX}"));
        }
        wtr.write_record(&header)?;

        for r in 0..self.nrows() {
            let mut record = Vec::with_capacity(header.len());
            if let Some(codes) = codes {
                record.push(codes[r].to_string());
            }
            for interval in self.row(r) {
                record.push(interval.low.to_string());
                record.push(interval.high.to_string());
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
