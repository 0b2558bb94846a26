use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{
    config::Config, db::connection::DbPool, services::calendar_service::CalendarService,
    utils::time,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub calendars: CalendarService,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let calendars = CalendarService::new(pool.clone());
        Self {
            pool,
            config,
            calendars,
        }
    }

    pub fn time_zone(&self) -> &Tz {
        &self.config.time_zone
    }

    /// Today's date in the configured time zone.
    pub fn today(&self) -> NaiveDate {
        time::today_local(&self.config.time_zone)
    }
}
