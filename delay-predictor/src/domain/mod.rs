//! Domain types for the delay predictor.
//!
//! Schedule times and predicted arrival clock readings. Parsing is explicit
//! and typed; the fail-soft NaN policy for schedule inputs lives on
//! [`TimeInput`].

mod time;

pub use time::{
    ArrivalClock, ClockTime, InvalidArrivalClock, MINUTES_PER_DAY, TimeError, TimeInput,
    parse_clock,
};
