//! The weather-type decision tree.
//!
//! Nodes live in an arena owned by [`DecisionTree`]; children and parents are
//! arena indices, so the parent link is a plain lookup and never an owner.
//! A built tree is immutable and can be shared freely between threads.

use itertools::Itertools;
use ndarray::{ArrayView2, Axis};
use serde::Serialize;

#[cfg(feature = "use-rayon")]
use rayon::prelude::*;

use crate::breakpoints::{BreakpointTable, SparseTable};
use crate::error::{Result, TreeError};
use crate::interval::Interval;
use crate::predictor::{Predictor, PredictorValues};

mod builder;
mod code;
pub mod export;
pub mod params;


pub use code::{Code, MAX_BRANCHES};
pub use export::{ExportMeta, ExportNode};
pub use params::{IndexConvention, TreeParams, TreeParamsBuilder};

/// Index of a node in the tree's arena.
pub type NodeId = usize;

/// The root always occupies the first arena slot.
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Root,
    Internal {
        predictor: usize,
        bound: Interval,
    },
    Leaf {
        predictor: usize,
        bound: Interval,
        leaf_index: usize,
        /// Row of the dense breakpoint table this weather type was built from.
        row: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    code: Code,
    index: usize,
    min_leaf: usize,
    max_leaf: usize,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    /// Position of the node's predictor, `-1` for the root.
    pub fn level(&self) -> i64 {
        self.predictor().map_or(-1, |p| p as i64)
    }

    pub fn predictor(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Root => None,
            NodeKind::Internal { predictor, .. } | NodeKind::Leaf { predictor, .. } => {
                Some(predictor)
            }
        }
    }

    pub fn bound(&self) -> Option<Interval> {
        match self.kind {
            NodeKind::Root => None,
            NodeKind::Internal { bound, .. } | NodeKind::Leaf { bound, .. } => Some(bound),
        }
    }

    pub fn leaf_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf { leaf_index, .. } => Some(leaf_index),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Lookup key under the tree's [`IndexConvention`].
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn min_leaf_index(&self) -> usize {
        self.min_leaf
    }

    pub fn max_leaf_index(&self) -> usize {
        self.max_leaf
    }
}

/// Result of classifying one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    #[serde(skip)]
    pub leaf: NodeId,
    pub code: Code,
    #[serde(rename = "idxWT")]
    pub index: usize,
    /// Predictor bounds traversed from the root down to the leaf.
    pub bounds: Vec<(String, Interval)>,
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    predictors: Vec<Predictor>,
    nodes: Vec<Node>,
    /// Leaf node ids ordered by leaf index.
    leaves: Vec<NodeId>,
    /// Leaf node id for every row of the source table.
    row_leaves: Vec<NodeId>,
    params: TreeParams,
}

impl DecisionTree {
    /// Builds a tree from a dense breakpoint table.
    ///
    /// `predictors` must list the table's columns in order, each with its
    /// declared admissible range.
    pub fn build(
        predictors: &[Predictor],
        table: &BreakpointTable,
        params: &TreeParams,
    ) -> Result<Self> {
        builder::build(predictors, table, params)
    }

    /// Expands a sparse table and builds the tree from it.
    pub fn from_sparse(
        predictors: &[Predictor],
        table: &SparseTable,
        params: &TreeParams,
    ) -> Result<Self> {
        Self::build(predictors, &table.expand()?, params)
    }

    pub fn predictors(&self) -> &[Predictor] {
        &self.predictors
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.nodes[id].parent.map(|p| &self.nodes[p])
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.nodes[id].children.iter().map(move |&c| &self.nodes[c])
    }

    pub fn n_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// Leaf node ids in leaf-index order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub fn leaf(&self, leaf_index: usize) -> Option<&Node> {
        self.leaves.get(leaf_index).map(|&id| &self.nodes[id])
    }

    /// Levels of the predictors that split somewhere in the tree, ascending.
    ///
    /// Classification only ever looks these up.
    pub fn split_predictors(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .filter_map(Node::predictor)
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Names of split predictors absent from `columns`, in split order.
    pub fn missing_predictors<S: AsRef<str>>(&self, columns: &[S]) -> Vec<&str> {
        self.split_predictors()
            .into_iter()
            .map(|level| self.predictors[level].name.as_str())
            .filter(|name| !columns.iter().any(|c| c.as_ref() == *name))
            .collect()
    }

    /// Code of the weather type built from each table row, in row order.
    pub fn row_codes(&self) -> Vec<Code> {
        self.row_leaves
            .iter()
            .map(|&id| self.nodes[id].code.clone())
            .collect()
    }

    pub fn find_by_code(&self, code: &Code) -> Option<NodeId> {
        self.nodes.iter().position(|n| &n.code == code)
    }

    /// Nodes from the root's first child down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ROOT {
                break;
            }
            path.push(node);
            current = self.nodes[node].parent;
        }
        path.reverse();
        path
    }

    /// Walks from the root to the leaf whose intervals contain `values`.
    ///
    /// Only predictors that split along the walk are looked up; the others may be
    /// missing from `values`.
    pub fn classify<V: PredictorValues + ?Sized>(&self, values: &V) -> Result<Classification> {
        let mut current = ROOT;
        let mut bounds = Vec::new();

        while let Some(&first) = self.nodes[current].children.first() {
            let Some(level) = self.nodes[first].predictor() else {
                break;
            };
            let predictor = &self.predictors[level];
            let value = values
                .value(level, &predictor.name)
                .ok_or_else(|| TreeError::MissingPredictor {
                    predictor: predictor.name.clone(),
                })?;

            let (next, bound) = self.nodes[current]
                .children
                .iter()
                .find_map(|&c| {
                    self.nodes[c]
                        .bound()
                        .filter(|b| b.contains(value))
                        .map(|b| (c, b))
                })
                .ok_or_else(|| TreeError::ValueOutOfRange {
                    predictor: predictor.name.clone(),
                    value,
                    code: self.nodes[current].code.to_string(),
                })?;

            bounds.push((predictor.name.clone(), bound));
            current = next;
        }

        let leaf = &self.nodes[current];
        Ok(Classification {
            leaf: current,
            code: leaf.code.clone(),
            index: leaf.leaf_index().unwrap_or(leaf.index),
            bounds,
        })
    }

    /// Classifies every row of `x`, whose columns follow the predictor order.
    ///
    /// Failures are reported per row so a caller can skip bad observations.
    pub fn classify_rows(&self, x: ArrayView2<f64>) -> Vec<Result<Classification>> {
        #[cfg(not(feature = "use-rayon"))]
        {
            x.axis_iter(Axis(0))
                .map(|row| self.classify(&row))
                .collect()
        }
        #[cfg(feature = "use-rayon")]
        {
            (0..x.nrows())
                .into_par_iter()
                .map(|i| self.classify(&x.index_axis(Axis(0), i)))
                .collect()
        }
    }
}
