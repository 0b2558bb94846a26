//! Field rules and cross-field checks shared across request payloads.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use validator::{ValidationError, ValidationErrors};

use crate::models::rest::RestInterval;
use crate::validation::messages::{self, describe};

fn error(code: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(describe(code)))
}

/// Validates username format.
///
/// Requirements:
/// - Only alphanumeric characters and underscores
/// - 1-50 characters in length
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let length = username.chars().count();
    if length == 0 || length > messages::USERNAME_MAX_CHARS {
        return Err(error(messages::USERNAME_LENGTH));
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(error(messages::USERNAME_CHARACTERS));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < messages::PASSWORD_MIN_CHARS {
        return Err(error(messages::PASSWORD_LENGTH));
    }
    Ok(())
}

/// Rejects empty and whitespace-only values.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error(messages::REQUIRED));
    }
    Ok(())
}

/// Comments are required and at most 500 characters.
pub fn validate_comment(comment: &str) -> Result<(), ValidationError> {
    validate_not_blank(comment)?;
    if comment.chars().count() > messages::COMMENT_MAX_CHARS {
        return Err(error(messages::COMMENT_LENGTH));
    }
    Ok(())
}

/// Checks an attendance day's punches against its rests.
///
/// Empty rest placeholders are ignored.
pub fn validate_attendance_times(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    rests: &[RestInterval],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    match (start, end) {
        (Some(start), Some(end)) if end <= start => {
            errors.add("end_time", error(messages::END_BEFORE_START));
        }
        (None, Some(_)) => errors.add("end_time", error(messages::END_WITHOUT_START)),
        _ => {}
    }

    let mut open_rests = 0;
    for rest in rests.iter().filter(|rest| !rest.is_empty()) {
        match (rest.start_time, rest.end_time) {
            (None, Some(_)) => errors.add("rests", error(messages::REST_END_WITHOUT_START)),
            (Some(rest_start), rest_end) => {
                if let Some(rest_end) = rest_end {
                    if rest_end <= rest_start {
                        errors.add("rests", error(messages::REST_END_BEFORE_START));
                    }
                    if end.is_some_and(|end| rest_end > end) {
                        errors.add("rests", error(messages::REST_AFTER_WORK_END));
                    }
                } else {
                    open_rests += 1;
                    if end.is_some_and(|end| rest_start >= end) {
                        errors.add("rests", error(messages::REST_AFTER_WORK_END));
                    }
                }
                if start.is_some_and(|start| rest_start < start) {
                    errors.add("rests", error(messages::REST_BEFORE_WORK_START));
                }
            }
            (None, None) => {}
        }
    }
    if open_rests > 1 {
        errors.add("rests", error(messages::MULTIPLE_OPEN_RESTS));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
