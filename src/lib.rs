//! Weather-type decision trees.
//!
//! A calibration run describes its weather types as a breakpoint table: one row
//! per leaf, one `[low, high)` interval per predictor. [`SparseTable`] expands
//! the compact form of such a table, [`DecisionTree::build`] groups the rows into
//! a tree of nested splits, and [`DecisionTree::classify`] maps predictor values
//! to the weather type that contains them.
pub mod breakpoints;
pub mod config;
mod error;
pub mod interval;
pub mod predictor;
pub mod tree;

#[doc(hidden)]
pub mod test_data;

pub use breakpoints::{BreakpointTable, SparseCell, SparseTable};
pub use config::{PredictorConfig, TreeConfig};
pub use error::{Result, TreeError};
pub use interval::Interval;
pub use predictor::{Predictor, PredictorValues};
pub use tree::{
    Classification, Code, DecisionTree, IndexConvention, Node, NodeId, NodeKind, TreeParams,
    TreeParamsBuilder,
};
