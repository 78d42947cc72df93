//! Breakpoint tables shared by the unit tests, integration tests and benches.

use itertools::Itertools;

use crate::breakpoints::{BreakpointTable, SparseCell, SparseTable};
use crate::interval::Interval;
use crate::predictor::Predictor;

const INF: f64 = f64::INFINITY;
const NEG_INF: f64 = f64::NEG_INFINITY;

pub const DENSE_PREDICTORS: [&str; 5] = ["cpr", "tp_acc", "cp_acc", "cape_wa", "sr24h"];
pub const SPARSE_PREDICTORS: [&str; 5] = ["CPR", "TP", "WSPD", "CAPE", "SR"];

fn bins(edges: &[f64]) -> Vec<Interval> {
    edges
        .iter()
        .copied()
        .tuple_windows()
        .map(|(low, high)| Interval { low, high })
        .collect()
}

/// 36 weather types: cpr (2 bins) x tp_acc (2) x cp_acc (3) x sr24h (3),
/// with cape_wa spanning the whole line in every row.
pub fn dense_breakpoints() -> BreakpointTable {
    let cpr = bins(&[NEG_INF, 0.25, INF]);
    let tp = bins(&[NEG_INF, 2.0, INF]);
    let cp = bins(&[NEG_INF, 5.0, 20.0, INF]);
    let sr = bins(&[NEG_INF, 70.0, 275.0, INF]);

    let rows: Vec<Vec<Interval>> = [cpr, tp, cp, sr]
        .into_iter()
        .multi_cartesian_product()
        .map(|cell| vec![cell[0], cell[1], cell[2], Interval::FULL, cell[3]])
        .collect();

    BreakpointTable::from_rows(DENSE_PREDICTORS.map(String::from).to_vec(), &rows)
        .expect("fixture table is well formed")
}

pub fn dense_predictors() -> Vec<Predictor> {
    Predictor::unbounded(&DENSE_PREDICTORS)
}

/// Three sparse rows: wspd switches bins in row 1 and sr nests below it.
pub fn sparse_breakpoints() -> SparseTable {
    let rows: Vec<Vec<SparseCell>> = vec![
        vec![
            Some((NEG_INF, 0.25)),
            Some((NEG_INF, 2.0)),
            Some((5.0, 20.0)),
            Some((NEG_INF, INF)),
            Some((NEG_INF, 70.0)),
        ],
        vec![None, None, Some((20.0, INF)), None, Some((70.0, 275.0))],
        vec![None, None, None, None, Some((275.0, INF))],
    ];
    SparseTable::new(SPARSE_PREDICTORS.map(String::from).to_vec(), rows)
}

/// The same three rows as [`sparse_breakpoints`] in CSV form.
pub const SPARSE_CSV: &str = "\
CPR_thrL,CPR_thrH,TP_thrL,TP_thrH,WSPD_thrL,WSPD_thrH,CAPE_thrL,CAPE_thrH,SR_thrL,SR_thrH
-inf,0.25,-inf,2,5,20,-inf,inf,-inf,70
,,,,20,inf,,,70,275
,,,,,,,,275,inf
";

/// Ranges under which the sparse fixtures tile every predictor.
pub fn sparse_predictors() -> Vec<Predictor> {
    let ranges = [
        Interval { low: NEG_INF, high: 0.25 },
        Interval { low: NEG_INF, high: 2.0 },
        Interval { low: 5.0, high: INF },
        Interval::FULL,
        Interval::FULL,
    ];
    SPARSE_PREDICTORS
        .iter()
        .zip(ranges)
        .enumerate()
        .map(|(level, (name, range))| Predictor::new(*name, level, range))
        .collect()
}
