//! Calibration configuration: predictor order, admissible ranges and table format.
//!
//! ```json
//! {
//!   "predictors": [
//!     { "name": "cpr", "range": ["-inf", "inf"] },
//!     { "name": "wspd", "range": [5, "inf"] }
//!   ],
//!   "sparse": true,
//!   "index_convention": "last_child_first_leaf"
//! }
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::breakpoints::{read_sparse_csv, BreakpointTable};
use crate::error::Result;
use crate::interval::Interval;
use crate::predictor::Predictor;
use crate::tree::{DecisionTree, IndexConvention, TreeParams, TreeParamsBuilder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub name: String,
    #[serde(default = "full_range")]
    pub range: Interval,
}

fn full_range() -> Interval {
    Interval::FULL
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Predictors in split order.
    pub predictors: Vec<PredictorConfig>,
    /// Whether blank table cells inherit from the row above.
    #[serde(default = "default_true")]
    pub sparse: bool,
    #[serde(default)]
    pub index_convention: IndexConvention,
    #[serde(default = "default_true")]
    pub validate_tiling: bool,
}

impl TreeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn predictors(&self) -> Vec<Predictor> {
        self.predictors
            .iter()
            .enumerate()
            .map(|(level, p)| Predictor::new(p.name.clone(), level, p.range))
            .collect()
    }

    pub fn params(&self) -> TreeParams {
        TreeParamsBuilder::new()
            .index_convention(self.index_convention)
            .validate_tiling(self.validate_tiling)
            .build()
    }

    /// Reads a breakpoint table in the configured format.
    pub fn read_table<R: io::Read>(&self, reader: R) -> Result<BreakpointTable> {
        let table = read_sparse_csv(reader)?;
        if self.sparse {
            table.expand()
        } else {
            table.into_dense()
        }
    }

    pub fn build_tree(&self, table: &BreakpointTable) -> Result<DecisionTree> {
        DecisionTree::build(&self.predictors(), table, &self.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TreeConfig::from_json_str(
            r#"{"predictors": [{"name": "cpr"}, {"name": "wspd", "range": [5, "inf"]}]}"#,
        )
        .unwrap();
        assert!(config.sparse);
        assert!(config.validate_tiling);
        assert_eq!(config.index_convention, IndexConvention::LastChildFirstLeaf);

        let predictors = config.predictors();
        assert_eq!(predictors[0].range, Interval::FULL);
        assert_eq!(predictors[1].level, 1);
        assert_eq!(predictors[1].range, Interval::new(5.0, f64::INFINITY).unwrap());
    }

    #[test]
    fn test_config_rejects_inverted_range() {
        let result =
            TreeConfig::from_json_str(r#"{"predictors": [{"name": "cpr", "range": [1, 0]}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_reads_dense_table() {
        let config = TreeConfig::from_json_str(
            r#"{"predictors": [{"name": "wspd"}], "sparse": false, "index_convention": "first_leaf"}"#,
        )
        .unwrap();
        let csv = "wspd_thrL,wspd_thrH\n-inf,5\n5,inf\n";
        let table = config.read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.nrows(), 2);

        let tree = config.build_tree(&table).unwrap();
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.root().index(), 0);

        let sparse_csv = "wspd_thrL,wspd_thrH\n-inf,5\n,\n";
        assert!(config.read_table(sparse_csv.as_bytes()).is_err());
    }
}
