pub mod admin;
pub mod attendance;
pub mod attendance_utils;
pub mod auth;
pub mod change_requests;
pub mod holidays;
