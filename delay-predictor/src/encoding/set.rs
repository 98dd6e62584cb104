//! The station, train and day encoders as one read-only unit.

use super::error::UnknownCategory;
use super::vocabulary::{CategoricalVocabulary, VocabularyId};

/// The three fitted label encoders.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EncoderSet {
    station: CategoricalVocabulary,
    train: CategoricalVocabulary,
    day: CategoricalVocabulary,
}

impl EncoderSet {
    /// Create an encoder set from its three vocabularies.
    pub fn new(
        station: CategoricalVocabulary,
        train: CategoricalVocabulary,
        day: CategoricalVocabulary,
    ) -> Self {
        Self {
            station,
            train,
            day,
        }
    }

    /// Returns the vocabulary for the given id.
    pub fn vocabulary(&self, id: VocabularyId) -> &CategoricalVocabulary {
        match id {
            VocabularyId::Station => &self.station,
            VocabularyId::Train => &self.train,
            VocabularyId::Day => &self.day,
        }
    }

    /// Encode a label, failing if it was not seen at training time.
    pub fn encode(&self, id: VocabularyId, label: &str) -> Result<u32, UnknownCategory> {
        self.vocabulary(id)
            .code(label)
            .ok_or_else(|| UnknownCategory {
                vocabulary: id,
                label: label.to_string(),
            })
    }

    /// Decode a code back to its label.
    pub fn decode(&self, id: VocabularyId, code: u32) -> Option<&str> {
        self.vocabulary(id).label(code)
    }
}
