pub mod attendance;
pub mod change_request;
pub mod common;
pub mod holiday_calendar;
pub mod repository;
pub mod rest;
pub mod staff;
pub mod transaction;

pub use attendance::{AttendanceRepository, AttendanceRepositoryTrait};
pub use change_request::ChangeRequestRepository;
pub use holiday_calendar::{CompanyHolidayCalendarRepository, HolidayCalendarRepository};
pub use repository::Repository;
pub use rest::RestRepository;
pub use staff::StaffRepository;
