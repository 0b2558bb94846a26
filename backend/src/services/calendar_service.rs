//! Loads the holiday and company-holiday calendars for a date window.

use std::{future::Future, pin::Pin, sync::Arc};

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::holiday::{CompanyHolidayCalendar, HolidayCalendar};
use crate::repositories::holiday_calendar::{
    CompanyHolidayCalendarRepository, HolidayCalendarRepository,
};
use crate::services::calendar::Calendars;

type CalendarFuture = Pin<Box<dyn Future<Output = sqlx::Result<CalendarSet>> + Send + 'static>>;
type CalendarLoader = Arc<dyn Fn(NaiveDate, NaiveDate) -> CalendarFuture + Send + Sync>;

/// Both calendars restricted to one window.
#[derive(Debug, Clone, Default)]
pub struct CalendarSet {
    pub holidays: Vec<HolidayCalendar>,
    pub company_holidays: Vec<CompanyHolidayCalendar>,
}

impl CalendarSet {
    pub fn calendars(&self) -> Calendars<'_, HolidayCalendar, CompanyHolidayCalendar> {
        Calendars::new(&self.holidays, &self.company_holidays)
    }
}

#[derive(Clone)]
pub struct CalendarService {
    load: CalendarLoader,
}

impl CalendarService {
    pub fn new(pool: PgPool) -> Self {
        let load = move |from: NaiveDate, to: NaiveDate| {
            let pool = pool.clone();
            Box::pin(async move { load_from_db(&pool, from, to).await }) as CalendarFuture
        };
        Self {
            load: Arc::new(load),
        }
    }

    fn with_loader<F, Fut>(loader: F) -> Self
    where
        F: Fn(NaiveDate, NaiveDate) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = sqlx::Result<CalendarSet>> + Send + 'static,
    {
        Self {
            load: Arc::new(move |from, to| Box::pin(loader(from, to)) as CalendarFuture),
        }
    }

    /// Entries dated within `from..=to`.
    pub async fn load_range(&self, from: NaiveDate, to: NaiveDate) -> sqlx::Result<CalendarSet> {
        ensure_valid_range(from, to)?;
        (self.load)(from, to).await
    }

    pub async fn load_year(&self, year: i32) -> sqlx::Result<CalendarSet> {
        let (from, to) = year_bounds(year)?;
        self.load_range(from, to).await
    }
}

async fn load_from_db(pool: &PgPool, from: NaiveDate, to: NaiveDate) -> sqlx::Result<CalendarSet> {
    let holidays = HolidayCalendarRepository::new()
        .list_between(pool, from, to)
        .await?;
    let company_holidays = CompanyHolidayCalendarRepository::new()
        .list_between(pool, from, to)
        .await?;
    Ok(CalendarSet {
        holidays,
        company_holidays,
    })
}

fn ensure_valid_range(from: NaiveDate, to: NaiveDate) -> sqlx::Result<()> {
    if from > to {
        Err(sqlx::Error::Protocol(
            "invalid calendar window: start must not be after end".into(),
        ))
    } else {
        Ok(())
    }
}

pub fn year_bounds(year: i32) -> sqlx::Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| sqlx::Error::Protocol(format!("invalid year: {year}")))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| sqlx::Error::Protocol(format!("invalid year: {year}")))?;
    Ok((start, end))
}

/// In-memory calendars for tests that do not touch the database.
pub struct CalendarServiceStub {
    set: Arc<CalendarSet>,
}

impl CalendarServiceStub {
    pub fn new(
        holidays: impl IntoIterator<Item = HolidayCalendar>,
        company_holidays: impl IntoIterator<Item = CompanyHolidayCalendar>,
    ) -> Self {
        Self {
            set: Arc::new(CalendarSet {
                holidays: holidays.into_iter().collect(),
                company_holidays: company_holidays.into_iter().collect(),
            }),
        }
    }

    pub fn service(&self) -> CalendarService {
        let set = Arc::clone(&self.set);
        CalendarService::with_loader(move |from, to| {
            let set = Arc::clone(&set);
            async move {
                let in_range = |date: NaiveDate| date >= from && date <= to;
                Ok(CalendarSet {
                    holidays: set
                        .holidays
                        .iter()
                        .filter(|h| in_range(h.holiday_date))
                        .cloned()
                        .collect(),
                    company_holidays: set
                        .company_holidays
                        .iter()
                        .filter(|h| in_range(h.holiday_date))
                        .cloned()
                        .collect(),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stub() -> CalendarServiceStub {
        CalendarServiceStub::new(
            [
                HolidayCalendar::new(date(2024, 1, 1), "New Year's Day".into()),
                HolidayCalendar::new(date(2025, 1, 1), "New Year's Day".into()),
            ],
            [CompanyHolidayCalendar::new(
                date(2024, 12, 30),
                "Year-end closure".into(),
            )],
        )
    }

    #[tokio::test]
    async fn load_year_filters_to_window() {
        let service = stub().service();
        let set = service.load_year(2024).await.unwrap();
        assert_eq!(set.holidays.len(), 1);
        assert_eq!(set.company_holidays.len(), 1);

        let calendars = set.calendars();
        assert!(calendars.is_listed(date(2024, 12, 30)));
        assert!(!calendars.is_listed(date(2025, 1, 1)));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let service = stub().service();
        let result = service.load_range(date(2024, 2, 1), date(2024, 1, 1)).await;
        assert!(result.is_err());
    }

    #[test]
    fn year_bounds_cover_whole_year() {
        let (from, to) = year_bounds(2024).unwrap();
        assert_eq!(from, date(2024, 1, 1));
        assert_eq!(to, date(2024, 12, 31));
    }
}
