//! Shared fixtures for unit tests.

use std::path::Path;
use std::sync::Arc;

use crate::artifacts::ArtifactPaths;
use crate::encoding::{CategoricalVocabulary, EncoderSet};
use crate::model::BoostedModel;
use crate::service::PredictionContext;

pub(crate) const FIXTURE_STATIONS: [&str; 3] = ["BCT", "NDLS", "SBC"];
pub(crate) const FIXTURE_TRAINS: [&str; 3] = ["12321", "12951", "22691"];
pub(crate) const FIXTURE_DAYS: [&str; 7] = ["Fri", "Mon", "Sat", "Sun", "Thu", "Tue", "Wed"];

/// Two trees over a 0.5 base score.
///
/// Tree 0 splits `delay_till_now` at 5.0 (missing goes left) into leaf 1.5,
/// or a split on `station_enc` at 1.0 into leaves 4.0 / 6.0. Tree 1 is a
/// single 0.25 leaf.
pub(crate) const FIXTURE_MODEL_JSON: &str = r#"{
  "learner": {
    "attributes": {},
    "feature_names": [],
    "feature_types": [],
    "gradient_booster": {
      "model": {
        "gbtree_model_param": {"num_parallel_tree": "1", "num_trees": "2"},
        "iteration_indptr": [0, 1, 2],
        "tree_info": [0, 0],
        "trees": [
          {
            "base_weights": [0.0, 1.5, 0.0, 4.0, 6.0],
            "categories": [],
            "categories_nodes": [],
            "categories_segments": [],
            "categories_sizes": [],
            "default_left": [1, 0, 0, 0, 0],
            "id": 0,
            "left_children": [1, -1, 3, -1, -1],
            "loss_changes": [12.0, 0.0, 3.0, 0.0, 0.0],
            "parents": [2147483647, 0, 0, 2, 2],
            "right_children": [2, -1, 4, -1, -1],
            "split_conditions": [5.0, 1.5, 1.0, 4.0, 6.0],
            "split_indices": [3, 0, 0, 0, 0],
            "split_type": [0, 0, 0, 0, 0],
            "sum_hessian": [40.0, 18.0, 22.0, 9.0, 13.0],
            "tree_param": {"num_deleted": "0", "num_feature": "9", "num_nodes": "5", "size_leaf_vector": "1"}
          },
          {
            "base_weights": [0.25],
            "categories": [],
            "categories_nodes": [],
            "categories_segments": [],
            "categories_sizes": [],
            "default_left": [0],
            "id": 1,
            "left_children": [-1],
            "loss_changes": [0.0],
            "parents": [2147483647],
            "right_children": [-1],
            "split_conditions": [0.25],
            "split_indices": [0],
            "split_type": [0],
            "sum_hessian": [40.0],
            "tree_param": {"num_deleted": "0", "num_feature": "9", "num_nodes": "1", "size_leaf_vector": "1"}
          }
        ]
      },
      "name": "gbtree"
    },
    "learner_model_param": {
      "base_score": "5E-1",
      "boost_from_average": "1",
      "num_class": "0",
      "num_feature": "9",
      "num_target": "1"
    },
    "objective": {
      "name": "reg:squarederror",
      "reg_loss_param": {"scale_pos_weight": "1"}
    }
  },
  "version": [1, 7, 6]
}"#;

pub(crate) fn fixture_model() -> BoostedModel {
    BoostedModel::from_json(FIXTURE_MODEL_JSON).unwrap()
}

pub(crate) fn fixture_encoders() -> EncoderSet {
    EncoderSet::new(
        CategoricalVocabulary::from_labels(FIXTURE_STATIONS).unwrap(),
        CategoricalVocabulary::from_labels(FIXTURE_TRAINS).unwrap(),
        CategoricalVocabulary::from_labels(FIXTURE_DAYS).unwrap(),
    )
}

pub(crate) fn fixture_context() -> Arc<PredictionContext> {
    Arc::new(PredictionContext::new(fixture_encoders(), fixture_model()))
}

/// Write the fixture artifacts under their default names in `dir`.
///
/// The train encoder is written with integer classes, the way a data frame
/// with a numeric train column exports it.
pub(crate) fn write_fixture_artifacts(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths::in_dir(dir);
    std::fs::write(&paths.model, FIXTURE_MODEL_JSON).unwrap();
    std::fs::write(
        &paths.station_encoder,
        serde_json::json!({ "classes": FIXTURE_STATIONS }).to_string(),
    )
    .unwrap();
    std::fs::write(&paths.train_encoder, r#"{"classes": [12321, 12951, 22691]}"#).unwrap();
    std::fs::write(
        &paths.day_encoder,
        serde_json::json!(FIXTURE_DAYS).to_string(),
    )
    .unwrap();
    paths
}
