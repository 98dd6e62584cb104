//! Encoder error types.

use super::VocabularyId;

/// A label that was not seen when the encoders were fitted.
///
/// There is no meaningful numeric substitute for an unseen category, so
/// this aborts the prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {vocabulary} {label:?}: not in the trained vocabulary")]
pub struct UnknownCategory {
    /// Vocabulary the lookup was made in.
    pub vocabulary: VocabularyId,
    /// The label as supplied.
    pub label: String,
}

/// Reasons a vocabulary cannot be built from a list of labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidVocabulary {
    /// No labels at all
    #[error("vocabulary is empty")]
    Empty,

    /// The same label appears twice, so codes would not be a bijection
    #[error("duplicate label {0:?}")]
    Duplicate(String),

    /// More labels than codes can represent
    #[error("vocabulary has {0} labels, more than a u32 code can index")]
    TooLarge(usize),
}
