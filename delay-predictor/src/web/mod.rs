//! Web layer for the delay predictor.
//!
//! Provides HTTP endpoints for predictions and for listing the labels each
//! encoder knows.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
