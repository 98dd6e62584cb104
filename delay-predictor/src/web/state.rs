//! Application state for the web layer.

use crate::service::PredictionService;

/// Shared application state.
///
/// The prediction service holds the loaded artifacts behind an `Arc`, so
/// cloning per request is cheap and never reloads anything.
#[derive(Clone)]
pub struct AppState {
    /// Prediction pipeline over the loaded model and encoders
    pub predictor: PredictionService,
}

impl AppState {
    /// Create a new app state.
    pub fn new(predictor: PredictionService) -> Self {
        Self { predictor }
    }
}
