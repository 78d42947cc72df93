use itertools::Itertools;
use tracing::{debug, debug_span, info};

use super::{Code, DecisionTree, IndexConvention, Node, NodeId, NodeKind, TreeParams};
use super::{MAX_BRANCHES, ROOT};
use crate::breakpoints::BreakpointTable;
use crate::error::{Result, TreeError};
use crate::interval::Interval;
use crate::predictor::Predictor;

pub(super) fn build(
    predictors: &[Predictor],
    table: &BreakpointTable,
    params: &TreeParams,
) -> Result<DecisionTree> {
    check_columns(predictors, table)?;
    if table.is_empty() {
        return Err(TreeError::malformed(0, "breakpoint table has no rows"));
    }

    let _span = debug_span!("build_tree", rows = table.nrows(), predictors = predictors.len())
        .entered();

    let mut builder = TreeBuilder {
        table,
        predictors,
        params,
        nodes: vec![Node {
            kind: NodeKind::Root,
            parent: None,
            children: Vec::new(),
            code: Code::root(predictors.len()),
            index: 0,
            min_leaf: 0,
            max_leaf: 0,
        }],
        leaves: Vec::new(),
        row_leaves: vec![ROOT; table.nrows()],
    };

    let rows: Vec<usize> = (0..table.nrows()).collect();
    builder.grow(ROOT, &rows, 0)?;

    info!(
        leaves = builder.leaves.len(),
        nodes = builder.nodes.len(),
        "built weather-type tree"
    );

    Ok(DecisionTree {
        predictors: predictors.to_vec(),
        nodes: builder.nodes,
        leaves: builder.leaves,
        row_leaves: builder.row_leaves,
        params: params.clone(),
    })
}

fn check_columns(predictors: &[Predictor], table: &BreakpointTable) -> Result<()> {
    if predictors.is_empty() {
        return Err(TreeError::malformed(0, "no predictors configured"));
    }
    if table.ncols() != predictors.len() {
        return Err(TreeError::malformed(
            0,
            format!(
                "table has {} columns for {} predictors",
                table.ncols(),
                predictors.len()
            ),
        ));
    }
    for (level, (predictor, column)) in predictors.iter().zip(table.predictors()).enumerate() {
        if predictor.level != level || &predictor.name != column {
            return Err(TreeError::malformed(
                0,
                format!(
                    "column {level} is {column} but predictor {} is declared at level {}",
                    predictor.name, predictor.level
                ),
            ));
        }
    }
    Ok(())
}

/// Mutable state of one build: the arena under construction and the leaf counter.
struct TreeBuilder<'a> {
    table: &'a BreakpointTable,
    predictors: &'a [Predictor],
    params: &'a TreeParams,
    nodes: Vec<Node>,
    leaves: Vec<NodeId>,
    row_leaves: Vec<NodeId>,
}

impl TreeBuilder<'_> {
    /// Grows the subtree of `node` from `rows`, starting at predictor `level`.
    fn grow(&mut self, node: NodeId, rows: &[usize], level: usize) -> Result<()> {
        for level in level..self.predictors.len() {
            let range = self.predictors[level].range;
            let first = self.table.interval(rows[0], level);
            let uniform = rows
                .iter()
                .all(|&r| self.table.interval(r, level) == first);

            if uniform && first == range {
                debug!(
                    predictor = %self.predictors[level].name,
                    code = %self.nodes[node].code,
                    "predictor does not split this branch"
                );
                continue;
            }

            let groups = self.group_rows(rows, level);
            if self.params.validate_tiling {
                self.check_tiling(level, range, &groups)?;
            }
            if groups.len() > MAX_BRANCHES {
                return Err(TreeError::TooManyBranches {
                    predictor: self.predictors[level].name.clone(),
                    count: groups.len(),
                });
            }

            for (rank, (bound, subset)) in groups.into_iter().enumerate() {
                let child = self.add_child(node, level, bound, rank + 1);
                self.grow(child, &subset, level + 1)?;
            }
            self.close_internal(node);
            return Ok(());
        }

        self.close_leaf(node, rows)
    }

    /// Maximal contiguous runs of equal bounds on `level`, sorted by lower bound.
    fn group_rows(&self, rows: &[usize], level: usize) -> Vec<(Interval, Vec<usize>)> {
        let mut groups: Vec<(Interval, Vec<usize>)> = rows
            .iter()
            .chunk_by(|&&r| self.table.interval(r, level))
            .into_iter()
            .map(|(bound, run)| (bound, run.copied().collect()))
            .collect();
        groups.sort_by(|a, b| a.0.low.total_cmp(&b.0.low));
        groups
    }

    fn check_tiling(
        &self,
        level: usize,
        range: Interval,
        groups: &[(Interval, Vec<usize>)],
    ) -> Result<()> {
        let mismatch = |reason: String| TreeError::RangeMismatch {
            predictor: self.predictors[level].name.clone(),
            low: range.low,
            high: range.high,
            reason,
        };

        let mut cursor = range.low;
        for (bound, _) in groups {
            if bound.low > cursor {
                return Err(mismatch(format!("gap between {} and {}", cursor, bound.low)));
            }
            if bound.low < cursor {
                return Err(mismatch(format!("{bound} overlaps values below {cursor}")));
            }
            cursor = bound.high;
        }
        if cursor != range.high {
            return Err(mismatch(format!("intervals end at {cursor}")));
        }
        Ok(())
    }

    fn add_child(&mut self, parent: NodeId, level: usize, bound: Interval, rank: usize) -> NodeId {
        let id = self.nodes.len();
        let code = self.nodes[parent].code.with_rank(level, rank);
        self.nodes.push(Node {
            kind: NodeKind::Internal {
                predictor: level,
                bound,
            },
            parent: Some(parent),
            children: Vec::new(),
            code,
            index: 0,
            min_leaf: 0,
            max_leaf: 0,
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn close_internal(&mut self, node: NodeId) {
        let children = &self.nodes[node].children;
        let first = &self.nodes[children[0]];
        let last = &self.nodes[children[children.len() - 1]];
        let (min_leaf, max_leaf, last_child_first) = (first.min_leaf, last.max_leaf, last.min_leaf);

        let n = &mut self.nodes[node];
        n.min_leaf = min_leaf;
        n.max_leaf = max_leaf;
        n.index = match self.params.index_convention {
            IndexConvention::LastChildFirstLeaf => last_child_first,
            IndexConvention::FirstLeaf => min_leaf,
            IndexConvention::LastLeaf => max_leaf,
        };
    }

    fn close_leaf(&mut self, node: NodeId, rows: &[usize]) -> Result<()> {
        let NodeKind::Internal { predictor, bound } = self.nodes[node].kind else {
            return Err(TreeError::malformed(
                rows[0],
                "no predictor splits the breakpoint table",
            ));
        };
        if let Some(&duplicate) = rows.get(1) {
            return Err(TreeError::malformed(
                duplicate,
                format!("row repeats the bounds of row {}", rows[0]),
            ));
        }

        let leaf_index = self.leaves.len();
        let n = &mut self.nodes[node];
        n.kind = NodeKind::Leaf {
            predictor,
            bound,
            leaf_index,
            row: rows[0],
        };
        n.index = leaf_index;
        n.min_leaf = leaf_index;
        n.max_leaf = leaf_index;

        self.leaves.push(node);
        self.row_leaves[rows[0]] = node;
        Ok(())
    }
}
