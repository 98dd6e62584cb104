//! Regression tree evaluation.

use super::error::ModelError;

/// Marker XGBoost uses for "no child".
const NO_CHILD: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf {
        value: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
}

/// A single validated regression tree, nodes stored in array form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegressionTree {
    nodes: Vec<Node>,
}

/// Parallel node arrays as exported by XGBoost.
pub(crate) struct TreeArrays<'a> {
    pub left_children: &'a [i64],
    pub right_children: &'a [i64],
    pub split_indices: &'a [i64],
    pub split_conditions: &'a [f32],
    pub default_left: &'a [bool],
}

impl RegressionTree {
    /// Build a tree from its node arrays.
    ///
    /// Children must point strictly forward so traversal always ends, and
    /// every split must use a feature below `num_feature`.
    pub(crate) fn from_arrays(arrays: TreeArrays<'_>, num_feature: usize) -> Result<Self, String> {
        let n = arrays.left_children.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if arrays.right_children.len() != n
            || arrays.split_indices.len() != n
            || arrays.split_conditions.len() != n
            || arrays.default_left.len() != n
        {
            return Err(format!("node arrays differ in length (expected {n})"));
        }

        let child = |idx: usize, raw: i64| -> Result<usize, String> {
            usize::try_from(raw)
                .ok()
                .filter(|&c| c > idx && c < n)
                .ok_or_else(|| format!("node {idx} has invalid child {raw}"))
        };

        let mut nodes = Vec::with_capacity(n);
        for idx in 0..n {
            let (left, right) = (arrays.left_children[idx], arrays.right_children[idx]);
            if left == NO_CHILD {
                if right != NO_CHILD {
                    return Err(format!("node {idx} has only a right child"));
                }
                nodes.push(Node::Leaf {
                    value: arrays.split_conditions[idx],
                });
                continue;
            }

            let feature = usize::try_from(arrays.split_indices[idx])
                .ok()
                .filter(|&f| f < num_feature)
                .ok_or_else(|| {
                    format!(
                        "node {idx} splits on feature {} of {num_feature}",
                        arrays.split_indices[idx]
                    )
                })?;

            nodes.push(Node::Split {
                feature,
                threshold: arrays.split_conditions[idx],
                left: child(idx, left)?,
                right: child(idx, right)?,
                default_left: arrays.default_left[idx],
            });
        }

        Ok(Self { nodes })
    }

    /// Returns the number of nodes.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Walk from the root to a leaf and return its value.
    ///
    /// A NaN feature is treated as missing and follows the node's default
    /// direction; otherwise values below the threshold go left.
    pub(crate) fn predict(&self, tree: usize, features: &[f32]) -> Result<f32, ModelError> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or(ModelError::MissingNode { tree, node: idx })?;

            match *node {
                Node::Leaf { value } => return Ok(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = *features
                        .get(feature)
                        .ok_or(ModelError::FeatureOutOfRange { tree, feature })?;
                    idx = if value.is_nan() {
                        if default_left { left } else { right }
                    } else if value < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }

        Err(ModelError::Unterminated { tree })
    }
}
