//! Categorical encoders for station, train and weekday labels.
//!
//! Each encoder is a fixed vocabulary produced at training time. An unseen
//! label is a hard error: unlike a bad schedule time it has no numeric
//! stand-in that keeps the prediction meaningful.

mod error;
mod set;
mod vocabulary;

pub use error::{InvalidVocabulary, UnknownCategory};
pub use set::EncoderSet;
pub use vocabulary::{CategoricalVocabulary, InvalidVocabularyId, VocabularyId};
