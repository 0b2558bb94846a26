//! Catalog of validation codes and their user-facing messages.

pub const END_BEFORE_START: &str = "end_before_start";
pub const REST_END_BEFORE_START: &str = "rest_end_before_start";
pub const REST_BEFORE_WORK_START: &str = "rest_before_work_start";
pub const REST_AFTER_WORK_END: &str = "rest_after_work_end";
pub const MULTIPLE_OPEN_RESTS: &str = "multiple_open_rests";
pub const REST_END_WITHOUT_START: &str = "rest_end_without_start";
pub const END_WITHOUT_START: &str = "end_without_start";
pub const REQUIRED: &str = "required";
pub const COMMENT_LENGTH: &str = "comment_length";
pub const USERNAME_LENGTH: &str = "username_invalid_length";
pub const USERNAME_CHARACTERS: &str = "username_invalid_characters";
pub const PASSWORD_LENGTH: &str = "password_too_short";
pub const EMPTY_CHANGE_SET: &str = "empty_change_set";

pub const COMMENT_MAX_CHARS: usize = 500;
pub const USERNAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Message shown for a validation code; unknown codes fall back to a generic text.
pub fn describe(code: &str) -> &'static str {
    match code {
        END_BEFORE_START => "End time must be after start time",
        REST_END_BEFORE_START => "Rest end time must be after rest start time",
        REST_BEFORE_WORK_START => "Rest must not start before the work start time",
        REST_AFTER_WORK_END => "Rest must not extend past the work end time",
        MULTIPLE_OPEN_RESTS => "Only one rest may be in progress",
        REST_END_WITHOUT_START => "Rest end time requires a rest start time",
        END_WITHOUT_START => "End time requires a start time",
        REQUIRED => "This field is required",
        COMMENT_LENGTH => "Comment must be between 1 and 500 characters",
        USERNAME_LENGTH => "Username must be between 1 and 50 characters",
        USERNAME_CHARACTERS => "Username may only contain letters, digits and underscores",
        PASSWORD_LENGTH => "Password must be at least 8 characters",
        EMPTY_CHANGE_SET => "The request does not change anything",
        _ => "Invalid value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_a_specific_message() {
        let codes = [
            END_BEFORE_START,
            REST_END_BEFORE_START,
            REST_BEFORE_WORK_START,
            REST_AFTER_WORK_END,
            MULTIPLE_OPEN_RESTS,
            REST_END_WITHOUT_START,
            END_WITHOUT_START,
            REQUIRED,
            COMMENT_LENGTH,
            USERNAME_LENGTH,
            USERNAME_CHARACTERS,
            PASSWORD_LENGTH,
            EMPTY_CHANGE_SET,
        ];
        for code in codes {
            assert_ne!(describe(code), "Invalid value", "{code}");
        }
        assert_eq!(describe("unknown"), "Invalid value");
    }
}
