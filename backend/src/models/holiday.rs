use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::services::calendar::CalendarEntry;
use crate::types::{CompanyHolidayCalendarId, HolidayCalendarId};
use crate::validation::rules::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// A public holiday.
pub struct HolidayCalendar {
    pub id: HolidayCalendarId,
    pub holiday_date: NaiveDate,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HolidayCalendar {
    pub fn new(holiday_date: NaiveDate, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: HolidayCalendarId::new(),
            holiday_date,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// A day the company is closed that is not a public holiday.
pub struct CompanyHolidayCalendar {
    pub id: CompanyHolidayCalendarId,
    pub holiday_date: NaiveDate,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyHolidayCalendar {
    pub fn new(holiday_date: NaiveDate, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: CompanyHolidayCalendarId::new(),
            holiday_date,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CalendarEntry for HolidayCalendar {
    fn date(&self) -> NaiveDate {
        self.holiday_date
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl CalendarEntry for CompanyHolidayCalendar {
    fn date(&self) -> NaiveDate {
        self.holiday_date
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateHolidayPayload {
    pub holiday_date: NaiveDate,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, code = "holiday_name_length")
    )]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HolidayResponse {
    pub id: String,
    pub holiday_date: NaiveDate,
    pub name: String,
}

impl From<HolidayCalendar> for HolidayResponse {
    fn from(value: HolidayCalendar) -> Self {
        Self {
            id: value.id.to_string(),
            holiday_date: value.holiday_date,
            name: value.name,
        }
    }
}

impl From<CompanyHolidayCalendar> for HolidayResponse {
    fn from(value: CompanyHolidayCalendar) -> Self {
        Self {
            id: value.id.to_string(),
            holiday_date: value.holiday_date,
            name: value.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct YearCalendarResponse {
    pub year: i32,
    pub holidays: Vec<HolidayResponse>,
    pub company_holidays: Vec<HolidayResponse>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct HolidayYearQuery {
    pub year: Option<i32>,
}
