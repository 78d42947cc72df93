#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::thread;

    use super::test_data::{sparse_config, write_temp};
    use ndarray::Array2;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use wtree::{
        test_data::{dense_breakpoints, dense_predictors, sparse_predictors, SPARSE_CSV},
        DecisionTree, TreeConfig, TreeError, TreeParams,
    };

    #[test]
    fn test_config_round_trip_from_files() {
        let config_path = write_temp("config.json", super::test_data::SPARSE_CONFIG);
        let csv_path = write_temp("breakpoints.csv", SPARSE_CSV);

        let config = TreeConfig::from_path(&config_path).unwrap();
        assert_eq!(config.predictors(), sparse_predictors());

        let file = std::fs::File::open(&csv_path).unwrap();
        let table = config.read_table(file).unwrap();
        let tree = config.build_tree(&table).unwrap();
        assert_eq!(tree.n_leaves(), 6);
        assert_eq!(tree.root().code().to_string(), "00000");

        let mut out = Vec::new();
        table
            .write_csv(&mut out, Some(tree.row_codes().as_slice()))
            .unwrap();
        let dense = TreeConfig {
            sparse: false,
            ..sparse_config()
        };
        let reread = dense.read_table(out.as_slice()).unwrap();
        assert_eq!(reread, table);
        assert_eq!(dense.build_tree(&reread).unwrap().row_codes(), tree.row_codes());
    }

    #[test]
    fn test_skip_bad_observations() {
        let config = sparse_config();
        let table = config.read_table(SPARSE_CSV.as_bytes()).unwrap();
        let tree = config.build_tree(&table).unwrap();

        let observations = [
            [("WSPD", 12.0), ("SR", 50.0)],
            [("WSPD", 2.0), ("SR", 50.0)],
            [("WSPD", 25.0), ("SR", 500.0)],
            [("WSPD", 25.0), ("CAPE", 500.0)],
        ];
        let (mut codes, mut skipped) = (Vec::new(), 0);
        for observation in observations {
            let values: HashMap<&str, f64> = observation.into_iter().collect();
            match tree.classify(&values) {
                Ok(wt) => codes.push(wt.code.to_string()),
                Err(err) => {
                    assert!(err.is_recoverable(), "{err}");
                    skipped += 1;
                }
            }
        }
        assert_eq!(codes, ["00101", "00203"]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_concurrent_classification() {
        let tree =
            DecisionTree::build(&dense_predictors(), &dense_breakpoints(), &TreeParams::default())
                .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let x = Array2::from_shape_fn((400, 5), |(_, col)| match col {
            0 => rng.gen_range(-1.0..1.0),
            1 => rng.gen_range(0.0..5.0),
            2 => rng.gen_range(0.0..30.0),
            3 => rng.gen_range(-1000.0..1000.0),
            _ => rng.gen_range(0.0..500.0),
        });

        let expected: Vec<usize> = tree
            .classify_rows(x.view())
            .into_iter()
            .map(|r| r.unwrap().index)
            .collect();

        let chunks: Vec<Vec<usize>> = thread::scope(|s| {
            let handles: Vec<_> = x
                .axis_chunks_iter(ndarray::Axis(0), 100)
                .map(|chunk| {
                    let tree = &tree;
                    s.spawn(move || {
                        chunk
                            .outer_iter()
                            .map(|row| tree.classify(&row).unwrap().index)
                            .collect::<Vec<usize>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(chunks.concat(), expected);
    }

    #[test]
    fn test_unknown_table_columns_fail() {
        let config = sparse_config();
        let csv = "CPR_thrL,CPR_thrH\n-inf,0.25\n";
        let table = config.read_table(csv.as_bytes()).unwrap();
        assert!(matches!(
            config.build_tree(&table),
            Err(TreeError::MalformedBreakpoints { .. })
        ));
    }
}
