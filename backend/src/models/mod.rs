//! Data models shared across database access and API handlers.

pub mod attendance;
pub mod change_request;
pub mod holiday;
pub mod rest;
pub mod staff;
