//! Input validation for request payloads.
//!
//! Single-field rules plug into `#[derive(Validate)]`; cross-field checks
//! return `ValidationErrors` directly and convert into `AppError::Validation`.

pub mod messages;
pub mod rules;

pub use validator::Validate;
