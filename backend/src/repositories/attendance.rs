//! Attendance repository.
//!
//! [`AttendanceRepositoryTrait`] is mockable with mockall; use
//! `MockAttendanceRepositoryTrait` in unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::attendance::{Attendance, AttendanceDay};
use crate::models::rest::Rest;
use crate::repositories::common::{push_clause, push_date_range};
use crate::repositories::rest::RestRepository;
use crate::types::{AttendanceId, StaffId};

const TABLE_NAME: &str = "attendances";
const SELECT_COLUMNS: &str = "id, staff_id, work_date, start_time, end_time, go_directly_flag, \
     return_directly_flag, absent_flag, paid_holiday_flag, special_holiday_flag, \
     deemed_holiday_flag, remarks, substitute_holiday_date, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, db: &PgPool, id: AttendanceId) -> Result<Attendance, AppError>;

    /// The record of one staff member on one date, if any.
    async fn find_by_staff_and_date(
        &self,
        db: &PgPool,
        staff_id: StaffId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, AppError>;

    /// Records filtered by staff and inclusive date bounds, newest date first.
    async fn list_filtered(
        &self,
        db: &PgPool,
        staff_id: Option<StaffId>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>, AppError>;

    /// Records of one staff member in `from..=to` together with their rests.
    async fn find_days_in_range(
        &self,
        db: &PgPool,
        staff_id: StaffId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceDay>, AppError>;

    async fn create(&self, db: &PgPool, item: &Attendance) -> Result<Attendance, AppError>;

    async fn update(&self, db: &PgPool, item: &Attendance) -> Result<Attendance, AppError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AttendanceRepository;

impl AttendanceRepository {
    pub fn new() -> Self {
        Self
    }

    fn base_select_query() -> String {
        format!("SELECT {} FROM {}", SELECT_COLUMNS, TABLE_NAME)
    }

    /// Loads a record and locks it for the rest of the transaction.
    pub async fn find_for_update(
        &self,
        conn: &mut PgConnection,
        id: AttendanceId,
    ) -> Result<Attendance, AppError> {
        let query = format!("{} WHERE id = $1 FOR UPDATE", Self::base_select_query());
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))
    }

    /// Inserts or replaces the record for `(staff_id, work_date)` inside a transaction.
    pub async fn upsert_in(
        &self,
        conn: &mut PgConnection,
        item: &Attendance,
    ) -> Result<Attendance, AppError> {
        let query = format!(
            "INSERT INTO {} (id, staff_id, work_date, start_time, end_time, go_directly_flag, \
             return_directly_flag, absent_flag, paid_holiday_flag, special_holiday_flag, \
             deemed_holiday_flag, remarks, substitute_holiday_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             ON CONFLICT (staff_id, work_date) DO UPDATE SET \
             start_time = EXCLUDED.start_time, end_time = EXCLUDED.end_time, \
             go_directly_flag = EXCLUDED.go_directly_flag, \
             return_directly_flag = EXCLUDED.return_directly_flag, \
             absent_flag = EXCLUDED.absent_flag, paid_holiday_flag = EXCLUDED.paid_holiday_flag, \
             special_holiday_flag = EXCLUDED.special_holiday_flag, \
             deemed_holiday_flag = EXCLUDED.deemed_holiday_flag, remarks = EXCLUDED.remarks, \
             substitute_holiday_date = EXCLUDED.substitute_holiday_date, \
             updated_at = EXCLUDED.updated_at \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = bind_all(sqlx::query_as::<_, Attendance>(&query), item)
            .fetch_one(conn)
            .await?;
        Ok(row)
    }

    /// Writes punches, flags and remarks of an existing record inside a transaction.
    pub async fn update_in(
        &self,
        conn: &mut PgConnection,
        item: &Attendance,
    ) -> Result<Attendance, AppError> {
        let query = update_query();
        let row = bind_update(sqlx::query_as::<_, Attendance>(&query), item)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;
        Ok(row)
    }
}

type AttendanceQuery<'q> =
    sqlx::query::QueryAs<'q, Postgres, Attendance, sqlx::postgres::PgArguments>;

fn bind_all<'q>(query: AttendanceQuery<'q>, item: &'q Attendance) -> AttendanceQuery<'q> {
    query
        .bind(item.id)
        .bind(item.staff_id)
        .bind(item.work_date)
        .bind(item.start_time)
        .bind(item.end_time)
        .bind(item.go_directly_flag)
        .bind(item.return_directly_flag)
        .bind(item.absent_flag)
        .bind(item.paid_holiday_flag)
        .bind(item.special_holiday_flag)
        .bind(item.deemed_holiday_flag)
        .bind(&item.remarks)
        .bind(item.substitute_holiday_date)
        .bind(item.created_at)
        .bind(item.updated_at)
}

fn update_query() -> String {
    format!(
        "UPDATE {} SET start_time = $2, end_time = $3, go_directly_flag = $4, \
         return_directly_flag = $5, absent_flag = $6, paid_holiday_flag = $7, \
         special_holiday_flag = $8, deemed_holiday_flag = $9, remarks = $10, \
         substitute_holiday_date = $11, updated_at = $12 \
         WHERE id = $1 RETURNING {}",
        TABLE_NAME, SELECT_COLUMNS
    )
}

fn bind_update<'q>(query: AttendanceQuery<'q>, item: &'q Attendance) -> AttendanceQuery<'q> {
    query
        .bind(item.id)
        .bind(item.start_time)
        .bind(item.end_time)
        .bind(item.go_directly_flag)
        .bind(item.return_directly_flag)
        .bind(item.absent_flag)
        .bind(item.paid_holiday_flag)
        .bind(item.special_holiday_flag)
        .bind(item.deemed_holiday_flag)
        .bind(&item.remarks)
        .bind(item.substitute_holiday_date)
        .bind(item.updated_at)
}

/// Pairs records with their rests, keeping the record order.
pub fn assemble_days(records: Vec<Attendance>, rests: Vec<Rest>) -> Vec<AttendanceDay> {
    let mut by_attendance: HashMap<AttendanceId, Vec<Rest>> = HashMap::new();
    for rest in rests {
        by_attendance.entry(rest.attendance_id).or_default().push(rest);
    }
    records
        .into_iter()
        .map(|record| {
            let rests = by_attendance.remove(&record.id).unwrap_or_default();
            AttendanceDay::new(record, rests)
        })
        .collect()
}

#[async_trait]
impl AttendanceRepositoryTrait for AttendanceRepository {
    async fn find_by_id(&self, db: &PgPool, id: AttendanceId) -> Result<Attendance, AppError> {
        let query = format!("{} WHERE id = $1", Self::base_select_query());
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))
    }

    async fn find_by_staff_and_date(
        &self,
        db: &PgPool,
        staff_id: StaffId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, AppError> {
        let query = format!(
            "{} WHERE staff_id = $1 AND work_date = $2",
            Self::base_select_query()
        );
        let row = sqlx::query_as::<_, Attendance>(&query)
            .bind(staff_id)
            .bind(date)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    async fn list_filtered(
        &self,
        db: &PgPool,
        staff_id: Option<StaffId>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(Self::base_select_query());
        let mut has_clause = false;
        if let Some(staff_id) = staff_id {
            push_clause(&mut builder, &mut has_clause);
            builder.push("staff_id = ").push_bind(staff_id);
        }
        push_date_range(&mut builder, &mut has_clause, "work_date", from, to);
        builder.push(" ORDER BY work_date DESC, staff_id");
        let rows = builder
            .build_query_as::<Attendance>()
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    async fn find_days_in_range(
        &self,
        db: &PgPool,
        staff_id: StaffId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceDay>, AppError> {
        let query = format!(
            "{} WHERE staff_id = $1 AND work_date >= $2 AND work_date <= $3 ORDER BY work_date ASC",
            Self::base_select_query()
        );
        let records = sqlx::query_as::<_, Attendance>(&query)
            .bind(staff_id)
            .bind(from)
            .bind(to)
            .fetch_all(db)
            .await?;
        let ids: Vec<AttendanceId> = records.iter().map(|record| record.id).collect();
        let rests = RestRepository::new().find_by_attendances(db, &ids).await?;
        Ok(assemble_days(records, rests))
    }

    async fn create(&self, db: &PgPool, item: &Attendance) -> Result<Attendance, AppError> {
        let query = format!(
            "INSERT INTO {} (id, staff_id, work_date, start_time, end_time, go_directly_flag, \
             return_directly_flag, absent_flag, paid_holiday_flag, special_holiday_flag, \
             deemed_holiday_flag, remarks, substitute_holiday_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = bind_all(sqlx::query_as::<_, Attendance>(&query), item)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &Attendance) -> Result<Attendance, AppError> {
        let query = update_query();
        let row = bind_update(sqlx::query_as::<_, Attendance>(&query), item)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn mock_repository_is_send_sync() {
        fn check_send_sync<T: Send + Sync>() {}
        check_send_sync::<MockAttendanceRepositoryTrait>();
    }

    #[test]
    fn assemble_days_attaches_rests_to_their_record() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let first = Attendance::new(StaffId::new(), date, Utc::now());
        let second = Attendance::new(StaffId::new(), date, Utc::now());
        let now = Utc::now();
        let rests = vec![
            Rest::start(second.id, 1, now),
            Rest::start(first.id, 0, now),
            Rest::start(second.id, 0, now),
        ];

        let days = assemble_days(vec![first.clone(), second.clone()], rests);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].attendance.id, first.id);
        assert_eq!(days[0].rests.len(), 1);
        assert_eq!(days[1].rests.len(), 2);
        assert_eq!(days[1].rests[0].position, 0);
    }
}
