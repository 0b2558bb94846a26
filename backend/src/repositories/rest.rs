//! Rest repository.
//!
//! Rests are owned by an attendance record and addressed through it.

use crate::error::AppError;
use crate::models::rest::{Rest, RestInterval};
use crate::types::AttendanceId;
use sqlx::{PgConnection, PgPool};

const TABLE_NAME: &str = "rests";
const SELECT_COLUMNS: &str =
    "id, attendance_id, start_time, end_time, position, created_at, updated_at";

#[derive(Debug, Default, Clone, Copy)]
pub struct RestRepository;

impl RestRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_attendance(
        &self,
        db: &PgPool,
        attendance_id: AttendanceId,
    ) -> Result<Vec<Rest>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE attendance_id = $1 ORDER BY position ASC",
            SELECT_COLUMNS, TABLE_NAME
        );
        let rows = sqlx::query_as::<_, Rest>(&query)
            .bind(attendance_id)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    /// Same as [`Self::find_by_attendance`], read inside a transaction.
    pub async fn find_by_attendance_in(
        &self,
        conn: &mut PgConnection,
        attendance_id: AttendanceId,
    ) -> Result<Vec<Rest>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE attendance_id = $1 ORDER BY position ASC",
            SELECT_COLUMNS, TABLE_NAME
        );
        let rows = sqlx::query_as::<_, Rest>(&query)
            .bind(attendance_id)
            .fetch_all(conn)
            .await?;
        Ok(rows)
    }

    /// Rests of every listed attendance record, ordered by record then position.
    pub async fn find_by_attendances(
        &self,
        db: &PgPool,
        attendance_ids: &[AttendanceId],
    ) -> Result<Vec<Rest>, AppError> {
        if attendance_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<uuid::Uuid> = attendance_ids.iter().map(|id| *id.as_uuid()).collect();
        let query = format!(
            "SELECT {} FROM {} WHERE attendance_id = ANY($1) ORDER BY attendance_id, position ASC",
            SELECT_COLUMNS, TABLE_NAME
        );
        let rows = sqlx::query_as::<_, Rest>(&query)
            .bind(ids)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn next_position(
        &self,
        db: &PgPool,
        attendance_id: AttendanceId,
    ) -> Result<i32, AppError> {
        let query = format!(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM {} WHERE attendance_id = $1",
            TABLE_NAME
        );
        let next: i32 = sqlx::query_scalar(&query)
            .bind(attendance_id)
            .fetch_one(db)
            .await?;
        Ok(next)
    }

    pub async fn create(&self, db: &PgPool, item: &Rest) -> Result<Rest, AppError> {
        let query = format!(
            "INSERT INTO {} (id, attendance_id, start_time, end_time, position, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Rest>(&query)
            .bind(item.id)
            .bind(item.attendance_id)
            .bind(item.start_time)
            .bind(item.end_time)
            .bind(item.position)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    pub async fn update(&self, db: &PgPool, item: &Rest) -> Result<Rest, AppError> {
        let query = format!(
            "UPDATE {} SET start_time = $2, end_time = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Rest>(&query)
            .bind(item.id)
            .bind(item.start_time)
            .bind(item.end_time)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Rest not found".into()))?;
        Ok(row)
    }

    /// Replaces every rest of the record with `intervals`, skipping empty ones.
    pub async fn replace_for_attendance(
        &self,
        conn: &mut PgConnection,
        attendance_id: AttendanceId,
        intervals: &[RestInterval],
    ) -> Result<Vec<Rest>, AppError> {
        let delete = format!("DELETE FROM {} WHERE attendance_id = $1", TABLE_NAME);
        sqlx::query(&delete)
            .bind(attendance_id)
            .execute(&mut *conn)
            .await?;

        let insert = format!(
            "INSERT INTO {} (id, attendance_id, start_time, end_time, position, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let mut saved = Vec::new();
        for (position, interval) in intervals.iter().filter(|i| !i.is_empty()).enumerate() {
            let rest = Rest::from_interval(attendance_id, position as i32, interval);
            let row = sqlx::query_as::<_, Rest>(&insert)
                .bind(rest.id)
                .bind(rest.attendance_id)
                .bind(rest.start_time)
                .bind(rest.end_time)
                .bind(rest.position)
                .bind(rest.created_at)
                .bind(rest.updated_at)
                .fetch_one(&mut *conn)
                .await?;
            saved.push(row);
        }
        Ok(saved)
    }
}
