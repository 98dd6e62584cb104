//! Gradient-boosted models loaded from XGBoost's JSON export.
//!
//! Only the parts of the format needed for inference are read: the learner
//! parameters, the objective name, and either the tree arrays (`gbtree`) or
//! the weight vector (`gblinear`). Evaluation follows XGBoost in using
//! single precision for features, thresholds and the accumulated margin.

use serde::Deserialize;

use crate::features::{FEATURE_COUNT, FeatureVector};

use super::DelayModel;
use super::error::{ModelError, ModelFormatError};
use super::tree::{RegressionTree, TreeArrays};

/// Regression objectives whose prediction is the raw margin.
const IDENTITY_OBJECTIVES: &[&str] = &[
    "reg:squarederror",
    "reg:squaredlogerror",
    "reg:absoluteerror",
    "reg:pseudohubererror",
    "reg:quantileerror",
    "reg:linear",
];

/// Regression objectives that predict `exp(margin)`.
const LOG_OBJECTIVES: &[&str] = &["reg:gamma", "reg:tweedie", "count:poisson"];

#[derive(Debug, Deserialize)]
struct ModelDocument {
    learner: LearnerDocument,
    #[serde(default)]
    version: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct LearnerDocument {
    learner_model_param: LearnerModelParam,
    gradient_booster: BoosterDocument,
    objective: ObjectiveDocument,
    #[serde(default)]
    feature_names: Vec<String>,
}

/// XGBoost stores these numbers as strings.
#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_feature: String,
    #[serde(default)]
    num_target: Option<String>,
    #[serde(default)]
    num_class: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "name")]
enum BoosterDocument {
    #[serde(rename = "gbtree")]
    GbTree { model: GbTreeDocument },
    #[serde(rename = "gblinear")]
    GbLinear { model: GbLinearDocument },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct GbTreeDocument {
    trees: Vec<TreeDocument>,
    #[serde(default)]
    tree_info: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct TreeDocument {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct GbLinearDocument {
    weights: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ObjectiveDocument {
    name: String,
}

/// Older exports write `default_left` as 0/1, newer ones as booleans.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

/// How the summed margin becomes a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Identity,
    Log,
}

#[derive(Debug, Clone, PartialEq)]
enum Booster {
    Trees(Vec<RegressionTree>),
    Linear { weights: Vec<f32>, bias: f32 },
}

/// A trained gradient-boosted regression model.
///
/// Immutable once loaded; evaluation takes `&self` and is safe to share
/// across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedModel {
    booster: Booster,
    base_margin: f32,
    link: Link,
    objective: String,
    version: Option<String>,
}

impl BoostedModel {
    /// Parse and validate a model from XGBoost JSON text.
    pub fn from_json(text: &str) -> Result<Self, ModelFormatError> {
        let doc: ModelDocument = serde_json::from_str(text)?;
        Self::from_document(doc)
    }

    fn from_document(doc: ModelDocument) -> Result<Self, ModelFormatError> {
        let learner = doc.learner;
        let params = &learner.learner_model_param;

        let num_feature: usize = params.num_feature.trim().parse().map_err(|_| {
            ModelFormatError::Invalid(format!("num_feature {:?} is not a count", params.num_feature))
        })?;
        if num_feature != FEATURE_COUNT {
            return Err(ModelFormatError::Invalid(format!(
                "model expects {num_feature} features, feature vector has {FEATURE_COUNT}"
            )));
        }
        if !learner.feature_names.is_empty() && learner.feature_names.len() != FEATURE_COUNT {
            return Err(ModelFormatError::Invalid(format!(
                "model lists {} feature names, feature vector has {FEATURE_COUNT}",
                learner.feature_names.len()
            )));
        }
        for (name, value) in [("num_target", &params.num_target), ("num_class", &params.num_class)] {
            if let Some(value) = value
                && value.trim().parse::<u32>().unwrap_or(0) > 1
            {
                return Err(ModelFormatError::Unsupported(format!(
                    "{name} {value}: only single-output regression is supported"
                )));
            }
        }

        let objective = learner.objective.name;
        let link = if IDENTITY_OBJECTIVES.contains(&objective.as_str()) {
            Link::Identity
        } else if LOG_OBJECTIVES.contains(&objective.as_str()) {
            Link::Log
        } else {
            return Err(ModelFormatError::Unsupported(format!("objective {objective}")));
        };

        let base_score = parse_base_score(&params.base_score)?;
        let base_margin = match link {
            Link::Identity => base_score,
            Link::Log if base_score > 0.0 => base_score.ln(),
            Link::Log => {
                return Err(ModelFormatError::Invalid(format!(
                    "base_score {base_score} must be positive for {objective}"
                )));
            }
        };

        let booster = match learner.gradient_booster {
            BoosterDocument::GbTree { model } => Booster::Trees(convert_trees(model, num_feature)?),
            BoosterDocument::GbLinear { model } => convert_linear(model, num_feature)?,
            BoosterDocument::Other => {
                return Err(ModelFormatError::Unsupported(
                    "booster other than gbtree or gblinear".to_string(),
                ));
            }
        };

        let version = (!doc.version.is_empty()).then(|| {
            doc.version
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".")
        });

        Ok(Self {
            booster,
            base_margin,
            link,
            objective,
            version,
        })
    }

    /// Returns the training objective name.
    pub fn objective(&self) -> &str {
        &self.objective
    }

    /// Returns the XGBoost version that wrote the artifact, if recorded.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the number of trees, or zero for a linear booster.
    pub fn tree_count(&self) -> usize {
        match &self.booster {
            Booster::Trees(trees) => trees.len(),
            Booster::Linear { .. } => 0,
        }
    }

    /// Returns the total number of tree nodes, or zero for a linear booster.
    pub fn node_count(&self) -> usize {
        match &self.booster {
            Booster::Trees(trees) => trees.iter().map(RegressionTree::len).sum(),
            Booster::Linear { .. } => 0,
        }
    }

    /// Returns the booster kind as XGBoost names it.
    pub fn booster_name(&self) -> &'static str {
        match self.booster {
            Booster::Trees(_) => "gbtree",
            Booster::Linear { .. } => "gblinear",
        }
    }
}

impl DelayModel for BoostedModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let x: Vec<f32> = features.as_slice().iter().map(|&v| v as f32).collect();

        let mut margin = self.base_margin;
        match &self.booster {
            Booster::Trees(trees) => {
                for (idx, tree) in trees.iter().enumerate() {
                    margin += tree.predict(idx, &x)?;
                }
            }
            Booster::Linear { weights, bias } => {
                margin += bias;
                // Missing entries contribute nothing, as in a sparse row
                margin += weights
                    .iter()
                    .zip(&x)
                    .filter(|(_, v)| !v.is_nan())
                    .map(|(w, v)| w * v)
                    .sum::<f32>();
            }
        }

        Ok(match self.link {
            Link::Identity => f64::from(margin),
            Link::Log => f64::from(margin.exp()),
        })
    }
}

/// Parse `base_score`, accepting both `"5E-1"` and the bracketed
/// `"[5E-1]"` form newer XGBoost versions write.
fn parse_base_score(raw: &str) -> Result<f32, ModelFormatError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    inner
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ModelFormatError::Invalid(format!("base_score {raw:?} is not a number")))
}

fn convert_trees(
    model: GbTreeDocument,
    num_feature: usize,
) -> Result<Vec<RegressionTree>, ModelFormatError> {
    if model.tree_info.iter().any(|&group| group != 0) {
        return Err(ModelFormatError::Unsupported(
            "trees for more than one output group".to_string(),
        ));
    }

    model
        .trees
        .iter()
        .enumerate()
        .map(|(idx, tree)| {
            if tree.split_type.iter().any(|&t| t != 0) {
                return Err(ModelFormatError::Unsupported(format!(
                    "tree {idx} uses categorical splits"
                )));
            }
            let default_left: Vec<bool> = tree.default_left.iter().map(|f| f.is_set()).collect();
            RegressionTree::from_arrays(
                TreeArrays {
                    left_children: &tree.left_children,
                    right_children: &tree.right_children,
                    split_indices: &tree.split_indices,
                    split_conditions: &tree.split_conditions,
                    default_left: &default_left,
                },
                num_feature,
            )
            .map_err(|reason| ModelFormatError::Invalid(format!("tree {idx}: {reason}")))
        })
        .collect()
}

fn convert_linear(model: GbLinearDocument, num_feature: usize) -> Result<Booster, ModelFormatError> {
    let mut weights = model.weights;
    if weights.len() != num_feature + 1 {
        return Err(ModelFormatError::Invalid(format!(
            "gblinear has {} weights, expected {} (one per feature plus bias)",
            weights.len(),
            num_feature + 1
        )));
    }
    let bias = weights.pop().unwrap_or(0.0);
    Ok(Booster::Linear { weights, bias })
}
