//! Model error types.

/// Errors raised while evaluating a loaded model.
///
/// These indicate a broken artifact, not bad input, and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A tree references a node that does not exist
    #[error("tree {tree}: node {node} does not exist")]
    MissingNode { tree: usize, node: usize },

    /// A split references a feature beyond the vector
    #[error("tree {tree}: split on feature {feature} which is out of range")]
    FeatureOutOfRange { tree: usize, feature: usize },

    /// Traversal did not reach a leaf
    #[error("tree {tree}: traversal did not terminate")]
    Unterminated { tree: usize },
}

/// Reasons a model artifact cannot be turned into a usable model.
#[derive(Debug, thiserror::Error)]
pub enum ModelFormatError {
    /// Not valid JSON, or not the expected shape
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed but internally inconsistent
    #[error("invalid model: {0}")]
    Invalid(String),

    /// A booster, objective or feature this loader does not evaluate
    #[error("unsupported model: {0}")]
    Unsupported(String),
}
