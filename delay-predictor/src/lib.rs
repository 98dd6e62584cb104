//! Train arrival delay predictor.
//!
//! Turns a station, train, weekday, schedule times and the delay so far into
//! a predicted arrival delay and arrival time, using a previously trained
//! gradient-boosted model and its label encoders.

pub mod artifacts;
pub mod config;
pub mod domain;
pub mod encoding;
pub mod features;
pub mod model;
pub mod service;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;
