//! Categorical vocabularies.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::InvalidVocabulary;

/// The three categorical inputs the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabularyId {
    /// Station name
    Station,
    /// Train identifier (usually the train number)
    Train,
    /// Three-letter weekday abbreviation
    Day,
}

impl VocabularyId {
    /// All vocabularies, in feature-vector order of their codes.
    pub const ALL: [VocabularyId; 3] = [VocabularyId::Station, VocabularyId::Train, VocabularyId::Day];

    /// Returns the short name used in paths and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            VocabularyId::Station => "station",
            VocabularyId::Train => "train",
            VocabularyId::Day => "day",
        }
    }
}

/// Error returned when parsing an unknown vocabulary name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vocabulary {0:?}: expected station, train or day")]
pub struct InvalidVocabularyId(String);

impl FromStr for VocabularyId {
    type Err = InvalidVocabularyId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "station" => Ok(VocabularyId::Station),
            "train" => Ok(VocabularyId::Train),
            "day" => Ok(VocabularyId::Day),
            _ => Err(InvalidVocabularyId(s.to_string())),
        }
    }
}

impl fmt::Display for VocabularyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable label → code mapping fixed when the model was trained.
///
/// Codes are the label positions, so they are always contiguous from zero.
/// Lookup is an exact, case-sensitive match with no normalization.
///
/// # Examples
///
/// ```
/// use delay_predictor::encoding::CategoricalVocabulary;
///
/// let days = CategoricalVocabulary::from_labels(["Fri", "Mon", "Sat"]).unwrap();
/// assert_eq!(days.code("Mon"), Some(1));
/// assert_eq!(days.label(2), Some("Sat"));
///
/// // No case folding or trimming
/// assert_eq!(days.code("mon"), None);
/// assert_eq!(days.code(" Mon"), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CategoricalVocabulary {
    labels: Vec<String>,
    codes: HashMap<String, u32>,
}

impl CategoricalVocabulary {
    /// Build a vocabulary from labels in code order.
    ///
    /// Fails on an empty list or a repeated label.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, InvalidVocabulary>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(InvalidVocabulary::Empty);
        }

        let mut codes = HashMap::with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            let code = u32::try_from(idx).map_err(|_| InvalidVocabulary::TooLarge(labels.len()))?;
            if codes.insert(label.clone(), code).is_some() {
                return Err(InvalidVocabulary::Duplicate(label.clone()));
            }
        }

        Ok(Self { labels, codes })
    }

    /// Look up the code for a label.
    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    /// Look up the label for a code.
    pub fn label(&self, code: u32) -> Option<&str> {
        self.labels.get(code as usize).map(String::as_str)
    }

    /// Returns all labels in code order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed vocabulary; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Debug for CategoricalVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoricalVocabulary")
            .field("len", &self.labels.len())
            .finish()
    }
}
