//! Loading trained artifacts from disk.
//!
//! The model and the three label encoders are produced by the training
//! pipeline and exported as JSON. They are read once at startup into an
//! immutable [`PredictionContext`]; any failure here is fatal.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::encoding::{CategoricalVocabulary, EncoderSet, InvalidVocabulary, VocabularyId};
use crate::model::{BoostedModel, ModelFormatError};
use crate::service::PredictionContext;

/// Default model file name.
pub const DEFAULT_MODEL_FILE: &str = "xgb_train_delay_model.json";
/// Default station encoder file name.
pub const DEFAULT_STATION_ENCODER_FILE: &str = "le_station_encoder.json";
/// Default train encoder file name.
pub const DEFAULT_TRAIN_ENCODER_FILE: &str = "le_train_encoder.json";
/// Default day encoder file name.
pub const DEFAULT_DAY_ENCODER_FILE: &str = "le_day_encoder.json";

/// Errors loading an artifact. Each names the file involved.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoder file is not a list of classes
    #[error("failed to parse encoder {path}: {source}")]
    EncoderJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Encoder classes do not form a valid vocabulary
    #[error("invalid {vocabulary} encoder {path}: {source}")]
    Vocabulary {
        vocabulary: VocabularyId,
        path: PathBuf,
        #[source]
        source: InvalidVocabulary,
    },

    /// Model file could not be turned into a model
    #[error("failed to load model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelFormatError,
    },
}

/// Locations of the four artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub station_encoder: PathBuf,
    pub train_encoder: PathBuf,
    pub day_encoder: PathBuf,
}

impl ArtifactPaths {
    /// Artifacts under their default names in `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(DEFAULT_MODEL_FILE),
            station_encoder: dir.join(DEFAULT_STATION_ENCODER_FILE),
            train_encoder: dir.join(DEFAULT_TRAIN_ENCODER_FILE),
            day_encoder: dir.join(DEFAULT_DAY_ENCODER_FILE),
        }
    }

    /// Use a different model file.
    pub fn with_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model = path.into();
        self
    }

    /// Use a different station encoder file.
    pub fn with_station_encoder(mut self, path: impl Into<PathBuf>) -> Self {
        self.station_encoder = path.into();
        self
    }

    /// Use a different train encoder file.
    pub fn with_train_encoder(mut self, path: impl Into<PathBuf>) -> Self {
        self.train_encoder = path.into();
        self
    }

    /// Use a different day encoder file.
    pub fn with_day_encoder(mut self, path: impl Into<PathBuf>) -> Self {
        self.day_encoder = path.into();
        self
    }

    /// Returns the encoder path for a vocabulary.
    pub fn encoder(&self, id: VocabularyId) -> &Path {
        match id {
            VocabularyId::Station => &self.station_encoder,
            VocabularyId::Train => &self.train_encoder,
            VocabularyId::Day => &self.day_encoder,
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        // Default to the current directory
        Self::in_dir(".")
    }
}

/// A fitted label encoder's classes, either wrapped or as a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EncoderDocument {
    Wrapped { classes: Vec<ClassLabel> },
    Bare(Vec<ClassLabel>),
}

/// Integer classes appear when the training column was numeric.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassLabel {
    Text(String),
    Integer(i64),
}

impl From<ClassLabel> for String {
    fn from(label: ClassLabel) -> Self {
        match label {
            ClassLabel::Text(s) => s,
            ClassLabel::Integer(i) => i.to_string(),
        }
    }
}

fn read(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load one label encoder.
pub fn load_vocabulary(id: VocabularyId, path: &Path) -> Result<CategoricalVocabulary, ArtifactError> {
    let text = read(path)?;
    let doc: EncoderDocument =
        serde_json::from_str(&text).map_err(|source| ArtifactError::EncoderJson {
            path: path.to_path_buf(),
            source,
        })?;

    let classes = match doc {
        EncoderDocument::Wrapped { classes } => classes,
        EncoderDocument::Bare(classes) => classes,
    };

    let vocabulary =
        CategoricalVocabulary::from_labels(classes).map_err(|source| ArtifactError::Vocabulary {
            vocabulary: id,
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        vocabulary = %id,
        path = %path.display(),
        labels = vocabulary.len(),
        "loaded encoder"
    );
    Ok(vocabulary)
}

/// Load all three label encoders.
pub fn load_encoders(paths: &ArtifactPaths) -> Result<EncoderSet, ArtifactError> {
    Ok(EncoderSet::new(
        load_vocabulary(VocabularyId::Station, paths.encoder(VocabularyId::Station))?,
        load_vocabulary(VocabularyId::Train, paths.encoder(VocabularyId::Train))?,
        load_vocabulary(VocabularyId::Day, paths.encoder(VocabularyId::Day))?,
    ))
}

/// Load the regression model.
pub fn load_model(path: &Path) -> Result<BoostedModel, ArtifactError> {
    let text = read(path)?;
    let model = BoostedModel::from_json(&text).map_err(|source| ArtifactError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        booster = model.booster_name(),
        trees = model.tree_count(),
        nodes = model.node_count(),
        objective = model.objective(),
        version = model.version().unwrap_or("unknown"),
        "loaded model"
    );
    Ok(model)
}

/// Load every artifact into a ready-to-serve context.
pub fn load_context(paths: &ArtifactPaths) -> Result<PredictionContext, ArtifactError> {
    let encoders = load_encoders(paths)?;
    let model = load_model(&paths.model)?;
    Ok(PredictionContext::new(encoders, model))
}
