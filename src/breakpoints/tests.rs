use ndarray::array;

use super::*;
use crate::test_data::{dense_breakpoints, sparse_breakpoints, SPARSE_CSV};

const INF: f64 = f64::INFINITY;
const NEG_INF: f64 = f64::NEG_INFINITY;

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_expand_sparse_thresholds() {
    let table = sparse_breakpoints().expand().unwrap();
    assert_eq!(table.nrows(), 6);

    let expected_low = array![
        [NEG_INF, NEG_INF, 5.0, NEG_INF, NEG_INF],
        [NEG_INF, NEG_INF, 5.0, NEG_INF, 70.0],
        [NEG_INF, NEG_INF, 5.0, NEG_INF, 275.0],
        [NEG_INF, NEG_INF, 20.0, NEG_INF, NEG_INF],
        [NEG_INF, NEG_INF, 20.0, NEG_INF, 70.0],
        [NEG_INF, NEG_INF, 20.0, NEG_INF, 275.0],
    ];
    let expected_high = array![
        [0.25, 2.0, 20.0, INF, 70.0],
        [0.25, 2.0, 20.0, INF, 275.0],
        [0.25, 2.0, 20.0, INF, INF],
        [0.25, 2.0, INF, INF, 70.0],
        [0.25, 2.0, INF, INF, 275.0],
        [0.25, 2.0, INF, INF, INF],
    ];
    assert_eq!(table.low(), expected_low);
    assert_eq!(table.high(), expected_high);
}

#[test]
fn test_expand_requires_complete_first_row() {
    let sparse = SparseTable::new(
        names(&["a", "b"]),
        vec![vec![Some((NEG_INF, INF)), None], vec![None, Some((0.0, 1.0))]],
    );
    match sparse.expand() {
        Err(TreeError::MalformedBreakpoints { row, .. }) => assert_eq!(row, 0),
        other => panic!("expected malformed breakpoints, got {other:?}"),
    }
}

#[test]
fn test_expand_rejects_inverted_bounds() {
    let sparse = SparseTable::new(
        names(&["a"]),
        vec![vec![Some((NEG_INF, 1.0))], vec![Some((3.0, 3.0))]],
    );
    match sparse.expand() {
        Err(TreeError::MalformedBreakpoints { row, .. }) => assert_eq!(row, 1),
        other => panic!("expected malformed breakpoints, got {other:?}"),
    }

    let sparse = SparseTable::new(names(&["a"]), vec![vec![Some((f64::NAN, 1.0))]]);
    assert!(sparse.expand().is_err());
}

#[test]
fn test_expand_rejects_ragged_rows() {
    let sparse = SparseTable::new(
        names(&["a", "b"]),
        vec![vec![Some((NEG_INF, INF)), Some((NEG_INF, INF))], vec![None]],
    );
    assert!(matches!(
        sparse.expand(),
        Err(TreeError::MalformedBreakpoints { row: 1, .. })
    ));
}

#[test]
fn test_into_dense_keeps_rows() {
    let sparse = SparseTable::new(
        names(&["a", "b"]),
        vec![
            vec![Some((NEG_INF, 0.0)), Some((NEG_INF, INF))],
            vec![Some((0.0, INF)), Some((NEG_INF, INF))],
        ],
    );
    assert!(sparse.is_dense());
    let table = sparse.into_dense().unwrap();
    assert_eq!(table.nrows(), 2);
    assert_eq!(table.interval(1, 0), Interval::new(0.0, INF).unwrap());

    let sparse = SparseTable::new(
        names(&["a"]),
        vec![vec![Some((NEG_INF, 0.0))], vec![None]],
    );
    assert!(!sparse.is_dense());
    assert!(sparse.into_dense().is_err());
}

#[test]
fn test_table_shape_checks() {
    let low = array![[NEG_INF, 0.0]];
    let high = array![[0.0]];
    assert!(BreakpointTable::new(names(&["a", "b"]), low.clone(), high).is_err());

    let high = array![[0.0, INF]];
    assert!(BreakpointTable::new(names(&["a"]), low.clone(), high.clone()).is_err());
    let table = BreakpointTable::new(names(&["a", "b"]), low, high).unwrap();
    assert_eq!(table.column_index("b"), Some(1));
}

#[test]
fn test_read_sparse_csv() {
    let sparse = read_sparse_csv(SPARSE_CSV.as_bytes()).unwrap();
    assert_eq!(sparse, sparse_breakpoints());
    assert_eq!(
        BreakpointTable::from_sparse_csv(SPARSE_CSV.as_bytes()).unwrap(),
        sparse_breakpoints().expand().unwrap()
    );
}

#[test]
fn test_read_csv_ignores_other_columns() {
    let csv = "WT code,wspd_thrL,wspd_thrH\n00001,-inf,5\n00002,5,inf\n";
    let table = BreakpointTable::from_dense_csv(csv.as_bytes()).unwrap();
    assert_eq!(table.predictors(), &["wspd".to_string()]);
    assert_eq!(table.interval(0, 0), Interval::new(NEG_INF, 5.0).unwrap());
}

#[test]
fn test_read_csv_rejects_bad_headers_and_cells() {
    let unpaired = "wspd_thrL,sr_thrH\n-inf,inf\n";
    assert!(read_sparse_csv(unpaired.as_bytes()).is_err());

    let dangling = "wspd_thrL\n-inf\n";
    assert!(read_sparse_csv(dangling.as_bytes()).is_err());

    let half_filled = "wspd_thrL,wspd_thrH\n-inf,inf\n5,\n";
    assert!(matches!(
        read_sparse_csv(half_filled.as_bytes()),
        Err(TreeError::MalformedBreakpoints { row: 1, .. })
    ));

    let garbage = "wspd_thrL,wspd_thrH\nlow,inf\n";
    assert!(read_sparse_csv(garbage.as_bytes()).is_err());
}

#[test]
fn test_write_csv_with_codes() {
    let table = dense_breakpoints();
    let tree = crate::tree::DecisionTree::build(
        &crate::test_data::dense_predictors(),
        &table,
        &Default::default(),
    )
    .unwrap();

    let mut out = Vec::new();
    table.write_csv(&mut out, Some(tree.row_codes().as_slice())).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "WT code,cpr_thrL,cpr_thrH,tp_acc_thrL,tp_acc_thrH,cp_acc_thrL,cp_acc_thrH,\
         cape_wa_thrL,cape_wa_thrH,sr24h_thrL,sr24h_thrH"
    );
    assert_eq!(lines.next().unwrap(), "11101,-inf,0.25,-inf,2,-inf,5,-inf,inf,-inf,70");

    assert_eq!(BreakpointTable::from_dense_csv(text.as_bytes()).unwrap(), table);
    assert!(table.write_csv(Vec::new(), Some(&[][..])).is_err());
}

#[test]
fn test_split_row() {
    let table = BreakpointTable::from_rows(
        names(&["cpr", "wspd"]),
        &[
            vec![Interval::new(NEG_INF, 0.5).unwrap(), Interval::FULL],
            vec![Interval::new(0.5, INF).unwrap(), Interval::FULL],
        ],
    )
    .unwrap();

    let split = table.split_row(1, 1, &[20.0, 5.0]).unwrap();
    assert_eq!(split.nrows(), 4);
    assert_eq!(split.row(0), table.row(0));
    assert_eq!(split.high().column(1).to_vec(), vec![INF, 5.0, 20.0, INF]);
    assert_eq!(split.low().column(1).to_vec(), vec![NEG_INF, NEG_INF, 5.0, 20.0]);
    assert!(split.low().column(0).iter().skip(1).all(|&v| v == 0.5));
}

#[test]
fn test_split_row_rejects_values_outside_interval() {
    let table = BreakpointTable::from_rows(
        names(&["cpr"]),
        &[vec![Interval::new(0.0, 1.0).unwrap()]],
    )
    .unwrap();
    assert!(table.split_row(0, 0, &[1.0]).is_err());
    assert!(table.split_row(0, 0, &[0.0]).is_err());
    assert!(table.split_row(0, 0, &[0.5, 0.5]).is_err());
    assert!(table.split_row(0, 0, &[f64::NAN]).is_err());
    assert!(table.split_row(1, 0, &[0.5]).is_err());
    assert!(table.split_row(0, 1, &[0.5]).is_err());
    assert_eq!(table.split_row(0, 0, &[0.5]).unwrap().nrows(), 2);
}

#[test]
fn test_expand_rejects_dense_tables() {
    let mut out = Vec::new();
    dense_breakpoints().write_csv(&mut out, None).unwrap();
    match BreakpointTable::from_sparse_csv(out.as_slice()) {
        Err(err @ TreeError::MalformedBreakpoints { row: 18, .. }) => {
            assert!(err.to_string().contains("\"sparse\": false"));
        }
        other => panic!("expected malformed breakpoints, got {other:?}"),
    }
    assert_eq!(
        BreakpointTable::from_dense_csv(out.as_slice()).unwrap(),
        dense_breakpoints()
    );
}

#[test]
fn test_expand_limits_bins_per_column() {
    let edges = [NEG_INF, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, INF];
    let rows: Vec<Vec<SparseCell>> = edges
        .windows(2)
        .enumerate()
        .map(|(r, w)| {
            let wspd = if r == 0 { Some((NEG_INF, INF)) } else { None };
            vec![Some((w[0], w[1])), wspd]
        })
        .collect();

    let sparse = SparseTable::new(names(&["a", "b"]), rows.clone());
    assert!(matches!(
        sparse.expand(),
        Err(TreeError::MalformedBreakpoints { row: 9, .. })
    ));

    let sparse = SparseTable::new(names(&["a", "b"]), rows[..9].to_vec());
    assert_eq!(sparse.expand().unwrap().nrows(), 9);
}
