//! The prediction pipeline.
//!
//! Raw inputs go in; a predicted delay and arrival time come out. Errors are
//! deliberately asymmetric: an unknown station, train or day aborts the
//! request, while an unparsable schedule time only turns the affected
//! features (and so the prediction) into NaN.

use std::fmt;
use std::sync::Arc;

use crate::domain::{ArrivalClock, ClockTime, TimeInput};
use crate::encoding::{EncoderSet, UnknownCategory, VocabularyId};
use crate::features::FeatureVector;
use crate::model::{DelayModel, ModelError};

/// Errors that abort a prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    /// Station, train or day not seen at training time
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    /// The loaded model could not be evaluated
    #[error("model inference failed: {0}")]
    Model(#[from] ModelError),
}

/// Everything loaded from trained artifacts.
///
/// Built once before serving and shared read-only across requests.
pub struct PredictionContext {
    encoders: EncoderSet,
    model: Box<dyn DelayModel>,
}

impl PredictionContext {
    /// Create a context from loaded encoders and a model.
    pub fn new(encoders: EncoderSet, model: impl DelayModel + 'static) -> Self {
        Self {
            encoders,
            model: Box::new(model),
        }
    }

    /// Returns the label encoders.
    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    /// Returns the model.
    pub fn model(&self) -> &dyn DelayModel {
        self.model.as_ref()
    }
}

impl fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionContext")
            .field("encoders", &self.encoders)
            .finish_non_exhaustive()
    }
}

/// Raw inputs for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub station_name: String,
    pub train_id: String,
    pub day: String,
    pub scheduled_arrival: TimeInput,
    pub scheduled_departure: TimeInput,
    pub delay_till_now: f64,
}

/// The outcome of one prediction.
///
/// The arrival time is derived from the scheduled arrival and the predicted
/// delay on demand, never stored. Either may be NaN when a schedule time was
/// unparsable; check [`PredictionResult::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    predicted_delay_minutes: f64,
    scheduled_arrival_minutes: f64,
    clock: ArrivalClock,
}

impl PredictionResult {
    /// Returns the predicted delay in minutes (negative means early).
    pub fn predicted_delay_minutes(&self) -> f64 {
        self.predicted_delay_minutes
    }

    /// Returns scheduled arrival plus predicted delay, in minutes.
    pub fn predicted_arrival_minutes(&self) -> f64 {
        self.scheduled_arrival_minutes + self.predicted_delay_minutes
    }

    /// Returns the predicted arrival as a clock reading, if finite.
    pub fn predicted_arrival_clock(&self) -> Option<ClockTime> {
        ClockTime::from_minutes(self.predicted_arrival_minutes())
    }

    /// Returns the predicted arrival as "HH:MM", if finite.
    pub fn predicted_arrival_time(&self) -> Option<String> {
        self.predicted_arrival_clock()
            .map(|clock| clock.render(self.clock))
    }

    /// True when both the delay and the arrival time are usable.
    pub fn is_valid(&self) -> bool {
        self.predicted_delay_minutes.is_finite() && self.predicted_arrival_minutes().is_finite()
    }
}

/// Runs predictions against a loaded [`PredictionContext`].
///
/// Cheap to clone; clones share the same context.
#[derive(Debug, Clone)]
pub struct PredictionService {
    context: Arc<PredictionContext>,
    clock: ArrivalClock,
}

impl PredictionService {
    /// Create a service over a loaded context.
    pub fn new(context: Arc<PredictionContext>, clock: ArrivalClock) -> Self {
        Self { context, clock }
    }

    /// Returns the shared context.
    pub fn context(&self) -> &PredictionContext {
        &self.context
    }

    /// Encode the inputs and assemble the feature vector.
    ///
    /// Fails only on an unknown category. Bad schedule times produce NaN
    /// slots instead.
    pub fn features(
        &self,
        station_name: &str,
        train_id: &str,
        day: &str,
        scheduled_arrival: &TimeInput,
        scheduled_departure: &TimeInput,
        delay_till_now: f64,
    ) -> Result<FeatureVector, UnknownCategory> {
        let encoders = self.context.encoders();
        let station_code = encoders.encode(VocabularyId::Station, station_name)?;
        let train_code = encoders.encode(VocabularyId::Train, train_id)?;
        let day_code = encoders.encode(VocabularyId::Day, day)?;

        let arr_min = scheduled_arrival.to_minutes();
        let dep_min = scheduled_departure.to_minutes();

        Ok(FeatureVector::build(
            station_code,
            train_code,
            day_code,
            arr_min,
            dep_min,
            delay_till_now,
        ))
    }

    /// Predict the arrival delay for one train at one station.
    pub fn predict_delay(
        &self,
        station_name: &str,
        train_id: &str,
        day: &str,
        scheduled_arrival: &TimeInput,
        scheduled_departure: &TimeInput,
        delay_till_now: f64,
    ) -> Result<PredictionResult, PredictionError> {
        let features = self.features(
            station_name,
            train_id,
            day,
            scheduled_arrival,
            scheduled_departure,
            delay_till_now,
        )?;

        let mut predicted = self.context.model().predict(&features)?;

        // A NaN input must surface as a NaN prediction even when the model
        // routes missing values to a finite leaf.
        if features.has_unknown() {
            tracing::warn!(
                station = station_name,
                train = train_id,
                unknown = ?features.unknown_features(),
                "prediction degraded by unparsable schedule time"
            );
            predicted = f64::NAN;
        }

        let result = PredictionResult {
            predicted_delay_minutes: predicted,
            scheduled_arrival_minutes: features[FeatureVector::ARRIVAL],
            clock: self.clock,
        };

        tracing::debug!(
            station = station_name,
            train = train_id,
            day,
            delay = result.predicted_delay_minutes,
            arrival = result.predicted_arrival_time().as_deref().unwrap_or("unknown"),
            "predicted delay"
        );

        Ok(result)
    }

    /// Predict from a bundled request.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        self.predict_delay(
            &request.station_name,
            &request.train_id,
            &request.day,
            &request.scheduled_arrival,
            &request.scheduled_departure,
            request.delay_till_now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_context, fixture_encoders};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service() -> PredictionService {
        PredictionService::new(fixture_context(), ArrivalClock::Extended)
    }

    fn request(station: &str, arrival: &str) -> PredictionRequest {
        PredictionRequest {
            station_name: station.to_string(),
            train_id: "12321".to_string(),
            day: "Mon".to_string(),
            scheduled_arrival: TimeInput::from(arrival),
            scheduled_departure: TimeInput::from("08:30"),
            delay_till_now: 10.0,
        }
    }

    /// Counts calls and returns a fixed delay.
    struct CountingModel {
        calls: Arc<AtomicUsize>,
        delay: f64,
    }

    impl DelayModel for CountingModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.delay)
        }
    }

    struct BrokenModel;

    impl DelayModel for BrokenModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
            Err(ModelError::MissingNode { tree: 0, node: 9 })
        }
    }

    fn counting_service(delay: f64, clock: ArrivalClock) -> (PredictionService, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = CountingModel {
            calls: Arc::clone(&calls),
            delay,
        };
        let context = Arc::new(PredictionContext::new(fixture_encoders(), model));
        (PredictionService::new(context, clock), calls)
    }

    #[test]
    fn known_inputs_build_expected_time_slots() {
        let svc = service();
        let r = request("NDLS", "08:15");
        let features = svc
            .features(
                &r.station_name,
                &r.train_id,
                &r.day,
                &r.scheduled_arrival,
                &r.scheduled_departure,
                r.delay_till_now,
            )
            .unwrap();

        assert_eq!(
            &features.as_slice()[1..7],
            &[495.0, 505.0, 10.0, 510.0, 520.0, 10.0]
        );
        assert_eq!(features[FeatureVector::STATION], 1.0);
        assert_eq!(features[FeatureVector::TRAIN], 0.0);
        assert_eq!(features[FeatureVector::DAY], 1.0);
    }

    #[test]
    fn arrival_is_scheduled_plus_delay() {
        let result = service().predict(&request("NDLS", "08:15")).unwrap();

        assert_eq!(result.predicted_delay_minutes(), 6.75);
        assert_eq!(result.predicted_arrival_minutes(), 495.0 + 6.75);
        assert_eq!(result.predicted_arrival_time().as_deref(), Some("08:21"));
        assert!(result.is_valid());
    }

    #[test]
    fn unknown_station_fails_before_model_call() {
        let (svc, calls) = counting_service(3.0, ArrivalClock::Extended);

        let err = svc.predict(&request("UNKNOWN_XYZ", "08:15")).unwrap_err();
        assert_eq!(
            err,
            PredictionError::UnknownCategory(UnknownCategory {
                vocabulary: VocabularyId::Station,
                label: "UNKNOWN_XYZ".to_string(),
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_train_and_day_fail() {
        let svc = service();
        let mut r = request("NDLS", "08:15");
        r.train_id = "99999".to_string();
        assert!(matches!(
            svc.predict(&r),
            Err(PredictionError::UnknownCategory(UnknownCategory {
                vocabulary: VocabularyId::Train,
                ..
            }))
        ));

        let mut r = request("NDLS", "08:15");
        r.day = "Monday".to_string();
        assert!(matches!(
            svc.predict(&r),
            Err(PredictionError::UnknownCategory(UnknownCategory {
                vocabulary: VocabularyId::Day,
                ..
            }))
        ));
    }

    #[test]
    fn malformed_arrival_degrades_without_error() {
        let result = service().predict(&request("NDLS", "25:99")).unwrap();

        assert!(result.predicted_delay_minutes().is_nan());
        assert!(result.predicted_arrival_minutes().is_nan());
        assert_eq!(result.predicted_arrival_time(), None);
        assert!(!result.is_valid());
    }

    #[test]
    fn malformed_departure_degrades_delay() {
        let svc = service();
        let mut r = request("NDLS", "08:15");
        r.scheduled_departure = TimeInput::from("later");

        let result = svc.predict(&r).unwrap();
        assert!(result.predicted_delay_minutes().is_nan());
        assert_eq!(result.predicted_arrival_time(), None);
    }

    #[test]
    fn malformed_time_still_runs_model() {
        let (svc, calls) = counting_service(3.0, ArrivalClock::Extended);
        let result = svc.predict(&request("NDLS", "soon")).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.predicted_delay_minutes().is_nan());
    }

    #[test]
    fn model_error_aborts() {
        let context = Arc::new(PredictionContext::new(fixture_encoders(), BrokenModel));
        let svc = PredictionService::new(context, ArrivalClock::Extended);

        let err = svc.predict(&request("NDLS", "08:15")).unwrap_err();
        assert!(matches!(err, PredictionError::Model(_)));
        assert_eq!(
            err.to_string(),
            "model inference failed: tree 0: node 9 does not exist"
        );
    }

    #[test]
    fn numeric_schedule_minutes_are_accepted() {
        let svc = service();
        let mut r = request("NDLS", "08:15");
        r.scheduled_arrival = TimeInput::from(495u32);
        r.scheduled_departure = TimeInput::from(510u32);

        let from_numbers = svc.predict(&r).unwrap();
        let from_text = svc.predict(&request("NDLS", "08:15")).unwrap();
        assert_eq!(from_numbers, from_text);
    }

    #[test]
    fn arrival_past_midnight_is_not_wrapped_by_default() {
        let (svc, _) = counting_service(90.0, ArrivalClock::Extended);
        let mut r = request("NDLS", "23:50");
        r.scheduled_departure = TimeInput::from("23:55");

        let result = svc.predict(&r).unwrap();
        assert_eq!(result.predicted_arrival_time().as_deref(), Some("25:20"));
    }

    #[test]
    fn arrival_past_midnight_wraps_when_configured() {
        let (svc, _) = counting_service(90.0, ArrivalClock::Wrapped);
        let mut r = request("NDLS", "23:50");
        r.scheduled_departure = TimeInput::from("23:55");

        let result = svc.predict(&r).unwrap();
        assert_eq!(result.predicted_arrival_time().as_deref(), Some("01:20"));
    }

    #[test]
    fn early_running_prediction() {
        let (svc, _) = counting_service(-5.5, ArrivalClock::Extended);
        let result = svc.predict(&request("NDLS", "08:15")).unwrap();

        assert_eq!(result.predicted_arrival_minutes(), 489.5);
        assert_eq!(result.predicted_arrival_time().as_deref(), Some("08:09"));
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let svc = service();
        let r = request("NDLS", "08:15");

        let first = svc.predict(&r).unwrap();
        let second = svc.predict(&r).unwrap();
        assert_eq!(
            first.predicted_delay_minutes().to_bits(),
            second.predicted_delay_minutes().to_bits()
        );
        assert_eq!(first.predicted_arrival_time(), second.predicted_arrival_time());

        let degraded = request("NDLS", "25:99");
        let a = svc.predict(&degraded).unwrap();
        let b = svc.predict(&degraded).unwrap();
        assert_eq!(
            a.predicted_delay_minutes().to_bits(),
            b.predicted_delay_minutes().to_bits()
        );
    }

    #[test]
    fn concurrent_predictions_share_context() {
        let svc = service();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                std::thread::spawn(move || svc.predict(&request("NDLS", "08:15")).unwrap())
            })
            .collect();

        for handle in handles {
            let result = handle.join().unwrap();
            assert_eq!(result.predicted_delay_minutes(), 6.75);
        }
    }
}
