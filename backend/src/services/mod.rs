//! Domain derivations and the calendar loader.
//!
//! Everything except [`calendar_service`] is pure and synchronous.

pub mod attendance_status;
pub mod calendar;
pub mod calendar_service;
pub mod change_request;
pub mod day_summary;
pub mod overtime;
pub mod work_time;

use thiserror::Error;

/// Domain failures raised while applying attendance actions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    InvalidTimestamp(String),
    #[error("{0}")]
    Conflict(String),
}
