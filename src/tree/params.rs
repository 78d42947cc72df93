use serde::{Deserialize, Serialize};

/// Which leaf index an internal node reports as its lookup key.
///
/// Leaves always report their own sequential index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexConvention {
    /// First leaf of the last child's subtree. Matches existing calibration
    /// tables: for a node just above the leaves this is its largest leaf index.
    #[default]
    LastChildFirstLeaf,
    /// Smallest leaf index under the node.
    FirstLeaf,
    /// Largest leaf index under the node.
    LastLeaf,
}

#[derive(Debug, Clone)]
pub struct TreeParams {
    pub index_convention: IndexConvention,
    pub validate_tiling: bool,
}

// Builder for TreeParams
#[derive(Debug, Clone)]
pub struct TreeParamsBuilder {
    index_convention: IndexConvention,
    validate_tiling: bool,
}

impl TreeParamsBuilder {
    pub fn new() -> Self {
        Self {
            index_convention: IndexConvention::default(),
            validate_tiling: true,
        }
    }

    pub fn index_convention(mut self, index_convention: IndexConvention) -> Self {
        self.index_convention = index_convention;
        self
    }

    pub fn validate_tiling(mut self, validate_tiling: bool) -> Self {
        self.validate_tiling = validate_tiling;
        self
    }

    pub fn build(self) -> TreeParams {
        TreeParams {
            index_convention: self.index_convention,
            validate_tiling: self.validate_tiling,
        }
    }
}

impl Default for TreeParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParamsBuilder::new().build()
    }
}
