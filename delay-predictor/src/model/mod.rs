//! Model inference.
//!
//! The trained model is an opaque artifact behind the [`DelayModel`] trait.
//! [`BoostedModel`] evaluates gradient-boosted models exported as XGBoost
//! JSON.

mod error;
mod tree;
mod xgboost;

pub use error::{ModelError, ModelFormatError};
pub use xgboost::BoostedModel;

use crate::features::FeatureVector;

/// A regression model mapping a feature vector to a delay in minutes.
///
/// Implementations must be side-effect free: the same vector always gives
/// the same answer, and a prediction may be negative (early running).
pub trait DelayModel: Send + Sync {
    /// Predict the arrival delay in minutes.
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}
