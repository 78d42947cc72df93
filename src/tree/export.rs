//! Nested, serializable view of a built tree for inspection and rendering.

use serde::{Deserialize, Serialize};

use super::{DecisionTree, NodeId, ROOT};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMeta {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub predictor: Option<String>,
    pub level: i64,
    #[serde(rename = "idxWT")]
    pub index: usize,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNode {
    pub name: String,
    pub children: Vec<ExportNode>,
    /// Code of the parent node; `None` for the root.
    pub parent: Option<String>,
    pub meta: ExportMeta,
}

impl ExportNode {
    /// Clears every parent reference, leaving only the downward structure.
    pub fn without_parents(mut self) -> Self {
        self.parent = None;
        self.children = self
            .children
            .into_iter()
            .map(ExportNode::without_parents)
            .collect();
        self
    }

    /// Number of nodes in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ExportNode::count).sum::<usize>()
    }
}

impl DecisionTree {
    /// Label used for a node in exports: `Root` or `low < predictor < high`.
    pub fn label(&self, id: NodeId) -> String {
        let node = self.node(id);
        match (node.predictor(), node.bound()) {
            (Some(p), Some(bound)) => bound.label(&self.predictors[p].name),
            _ => "Root".to_string(),
        }
    }

    pub fn export(&self) -> ExportNode {
        self.export_node(ROOT)
    }

    fn export_node(&self, id: NodeId) -> ExportNode {
        let node = self.node(id);
        ExportNode {
            name: self.label(id),
            children: node
                .children()
                .iter()
                .map(|&c| self.export_node(c))
                .collect(),
            parent: node.parent().map(|p| self.node(p).code().to_string()),
            meta: ExportMeta {
                predictor: node.predictor().map(|p| self.predictors[p].name.clone()),
                level: node.level(),
                index: node.index(),
                code: node.code().to_string(),
            },
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.export())?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }
}
