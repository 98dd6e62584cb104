//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::TimeInput;
use crate::service::{PredictionRequest, PredictionResult};

/// Request to predict a train's arrival delay.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Station name, as known to the station encoder
    pub station_name: String,

    /// Train identifier, as known to the train encoder
    pub train_id: String,

    /// Three-letter weekday (e.g., "Mon")
    pub day: String,

    /// Scheduled arrival: "HH:MM" (optionally with AM/PM) or minutes
    pub scheduled_arrival: TimeInput,

    /// Scheduled departure: "HH:MM" (optionally with AM/PM) or minutes
    pub scheduled_departure: TimeInput,

    /// Delay accrued so far in minutes (negative when running early)
    pub delay_till_now: f64,
}

impl From<PredictRequest> for PredictionRequest {
    fn from(req: PredictRequest) -> Self {
        PredictionRequest {
            station_name: req.station_name,
            train_id: req.train_id,
            day: req.day,
            scheduled_arrival: req.scheduled_arrival,
            scheduled_departure: req.scheduled_departure,
            delay_till_now: req.delay_till_now,
        }
    }
}

/// Response for a prediction.
///
/// When a schedule time could not be parsed the prediction is degraded:
/// the numeric fields are null and `valid` is false.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Predicted delay in minutes
    pub predicted_delay_minutes: Option<f64>,

    /// Predicted delay to two decimals, "NaN" when degraded
    pub predicted_delay_display: String,

    /// Predicted arrival as "HH:MM"
    pub predicted_arrival_time: Option<String>,

    /// Whether the prediction is usable
    pub valid: bool,
}

impl PredictResponse {
    /// Create from a prediction result.
    pub fn from_result(result: &PredictionResult) -> Self {
        let delay = result.predicted_delay_minutes();
        Self {
            predicted_delay_minutes: delay.is_finite().then_some(delay),
            predicted_delay_display: format!("{delay:.2}"),
            predicted_arrival_time: result.predicted_arrival_time(),
            valid: result.is_valid(),
        }
    }
}

/// Labels of one vocabulary, in code order.
#[derive(Debug, Serialize)]
pub struct VocabularyResponse {
    /// Vocabulary name (station, train or day)
    pub vocabulary: String,

    /// Known labels
    pub labels: Vec<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
