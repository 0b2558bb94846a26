pub mod attendance;
pub mod change_requests;
pub mod common;
pub mod export;
pub mod holiday_calendars;
pub mod staff;

pub use attendance::*;
pub use change_requests::*;
pub use export::*;
pub use holiday_calendars::*;
pub use staff::*;
