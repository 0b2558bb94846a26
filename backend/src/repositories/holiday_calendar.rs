//! Repositories for the public holiday and company holiday calendars.
//!
//! Both tables share one shape, so the queries are written once over the table name.

use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::models::holiday::{CompanyHolidayCalendar, HolidayCalendar};
use crate::repositories::repository::Repository;
use crate::types::{CompanyHolidayCalendarId, HolidayCalendarId};

const HOLIDAY_TABLE: &str = "holiday_calendars";
const COMPANY_HOLIDAY_TABLE: &str = "company_holiday_calendars";
const SELECT_COLUMNS: &str = "id, holiday_date, name, created_at, updated_at";

async fn list_between<T>(
    db: &PgPool,
    table: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> sqlx::Result<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let query = format!(
        "SELECT {} FROM {} WHERE holiday_date >= $1 AND holiday_date <= $2 ORDER BY holiday_date ASC",
        SELECT_COLUMNS, table
    );
    sqlx::query_as::<_, T>(&query)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await
}

async fn find_all_in<T>(db: &PgPool, table: &str) -> Result<Vec<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let query = format!(
        "SELECT {} FROM {} ORDER BY holiday_date ASC",
        SELECT_COLUMNS, table
    );
    Ok(sqlx::query_as::<_, T>(&query).fetch_all(db).await?)
}

async fn delete_from(db: &PgPool, table: &str, id: uuid::Uuid) -> Result<(), AppError> {
    let query = format!("DELETE FROM {} WHERE id = $1", table);
    let result = sqlx::query(&query).bind(id).execute(db).await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Calendar entry not found".into()));
    }
    Ok(())
}

fn insert_query(table: &str) -> String {
    format!(
        "INSERT INTO {} (id, holiday_date, name, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        table, SELECT_COLUMNS
    )
}

fn update_query(table: &str) -> String {
    format!(
        "UPDATE {} SET holiday_date = $2, name = $3, updated_at = $4 WHERE id = $1 RETURNING {}",
        table, SELECT_COLUMNS
    )
}

fn select_by_id_query(table: &str) -> String {
    format!("SELECT {} FROM {} WHERE id = $1", SELECT_COLUMNS, table)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HolidayCalendarRepository;

impl HolidayCalendarRepository {
    pub fn new() -> Self {
        Self
    }

    /// Entries dated within `from..=to`.
    pub async fn list_between(
        &self,
        db: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> sqlx::Result<Vec<HolidayCalendar>> {
        list_between(db, HOLIDAY_TABLE, from, to).await
    }

    pub async fn delete(&self, db: &PgPool, id: HolidayCalendarId) -> Result<(), AppError> {
        delete_from(db, HOLIDAY_TABLE, *id.as_uuid()).await
    }
}

impl Repository<HolidayCalendar> for HolidayCalendarRepository {
    const TABLE: &'static str = HOLIDAY_TABLE;
    type Id = HolidayCalendarId;

    async fn find_all(&self, db: &PgPool) -> Result<Vec<HolidayCalendar>, AppError> {
        find_all_in(db, HOLIDAY_TABLE).await
    }

    async fn find_by_id(
        &self,
        db: &PgPool,
        id: HolidayCalendarId,
    ) -> Result<HolidayCalendar, AppError> {
        sqlx::query_as::<_, HolidayCalendar>(&select_by_id_query(HOLIDAY_TABLE))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Holiday not found".into()))
    }

    async fn create(&self, db: &PgPool, item: &HolidayCalendar) -> Result<HolidayCalendar, AppError> {
        let row = sqlx::query_as::<_, HolidayCalendar>(&insert_query(HOLIDAY_TABLE))
            .bind(item.id)
            .bind(item.holiday_date)
            .bind(&item.name)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &HolidayCalendar) -> Result<HolidayCalendar, AppError> {
        sqlx::query_as::<_, HolidayCalendar>(&update_query(HOLIDAY_TABLE))
            .bind(item.id)
            .bind(item.holiday_date)
            .bind(&item.name)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Holiday not found".into()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CompanyHolidayCalendarRepository;

impl CompanyHolidayCalendarRepository {
    pub fn new() -> Self {
        Self
    }

    /// Entries dated within `from..=to`.
    pub async fn list_between(
        &self,
        db: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> sqlx::Result<Vec<CompanyHolidayCalendar>> {
        list_between(db, COMPANY_HOLIDAY_TABLE, from, to).await
    }

    pub async fn delete(&self, db: &PgPool, id: CompanyHolidayCalendarId) -> Result<(), AppError> {
        delete_from(db, COMPANY_HOLIDAY_TABLE, *id.as_uuid()).await
    }
}

impl Repository<CompanyHolidayCalendar> for CompanyHolidayCalendarRepository {
    const TABLE: &'static str = COMPANY_HOLIDAY_TABLE;
    type Id = CompanyHolidayCalendarId;

    async fn find_all(&self, db: &PgPool) -> Result<Vec<CompanyHolidayCalendar>, AppError> {
        find_all_in(db, COMPANY_HOLIDAY_TABLE).await
    }

    async fn find_by_id(
        &self,
        db: &PgPool,
        id: CompanyHolidayCalendarId,
    ) -> Result<CompanyHolidayCalendar, AppError> {
        sqlx::query_as::<_, CompanyHolidayCalendar>(&select_by_id_query(COMPANY_HOLIDAY_TABLE))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Company holiday not found".into()))
    }

    async fn create(
        &self,
        db: &PgPool,
        item: &CompanyHolidayCalendar,
    ) -> Result<CompanyHolidayCalendar, AppError> {
        let row = sqlx::query_as::<_, CompanyHolidayCalendar>(&insert_query(COMPANY_HOLIDAY_TABLE))
            .bind(item.id)
            .bind(item.holiday_date)
            .bind(&item.name)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        db: &PgPool,
        item: &CompanyHolidayCalendar,
    ) -> Result<CompanyHolidayCalendar, AppError> {
        sqlx::query_as::<_, CompanyHolidayCalendar>(&update_query(COMPANY_HOLIDAY_TABLE))
            .bind(item.id)
            .bind(item.holiday_date)
            .bind(&item.name)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Company holiday not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_target_the_given_table() {
        assert!(insert_query(COMPANY_HOLIDAY_TABLE).starts_with("INSERT INTO company_holiday_calendars"));
        assert!(update_query(HOLIDAY_TABLE).starts_with("UPDATE holiday_calendars"));
        assert!(select_by_id_query(HOLIDAY_TABLE).ends_with("FROM holiday_calendars WHERE id = $1"));
    }
}
