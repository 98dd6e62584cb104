//! The model's input feature vector.
//!
//! The slot order is part of the trained model's contract. Reordering it
//! without retraining silently produces wrong predictions.

use std::ops::Index;

/// Number of features the model consumes.
pub const FEATURE_COUNT: usize = 9;

/// Feature names in slot order, as used when the model was trained.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "station_enc",
    "arr_min",
    "arr_min_plus_delay",
    "delay_till_now",
    "dep_min",
    "dep_min_plus_delay",
    "delay_till_now_dep",
    "train_enc",
    "day_enc",
];

/// A fixed-order, 9-slot feature vector.
///
/// # Examples
///
/// ```
/// use delay_predictor::features::FeatureVector;
///
/// let v = FeatureVector::build(1, 0, 1, 495.0, 510.0, 10.0);
/// assert_eq!(v.as_slice(), &[1.0, 495.0, 505.0, 10.0, 510.0, 520.0, 10.0, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub const STATION: usize = 0;
    pub const ARRIVAL: usize = 1;
    pub const ARRIVAL_WITH_DELAY: usize = 2;
    pub const DELAY: usize = 3;
    pub const DEPARTURE: usize = 4;
    pub const DEPARTURE_WITH_DELAY: usize = 5;
    pub const DEPARTURE_DELAY: usize = 6;
    pub const TRAIN: usize = 7;
    pub const DAY: usize = 8;

    /// Assemble the vector from encoded categoricals, schedule minutes and
    /// the delay accrued so far.
    ///
    /// No validation: NaN schedule minutes flow into the slots derived from
    /// them.
    pub fn build(
        station_code: u32,
        train_code: u32,
        day_code: u32,
        arr_min: f64,
        dep_min: f64,
        current_delay: f64,
    ) -> Self {
        Self([
            f64::from(station_code),
            arr_min,
            arr_min + current_delay,
            current_delay,
            dep_min,
            dep_min + current_delay,
            current_delay,
            f64::from(train_code),
            f64::from(day_code),
        ])
    }

    /// Returns the slots in model order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns true if any slot is NaN.
    pub fn has_unknown(&self) -> bool {
        self.0.iter().any(|v| v.is_nan())
    }

    /// Returns the names of the NaN slots.
    pub fn unknown_features(&self) -> Vec<&'static str> {
        self.0
            .iter()
            .zip(FEATURE_NAMES)
            .filter(|(v, _)| v.is_nan())
            .map(|(_, name)| name)
            .collect()
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.0[idx]
    }
}
