//! Change request repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::change_request::{ChangeRequest, ChangeRequestStatus};
use crate::repositories::common::push_clause;
use crate::types::{AttendanceId, ChangeRequestId, StaffId};

const TABLE_NAME: &str = "change_requests";
const SELECT_COLUMNS: &str = "id, attendance_id, staff_id, work_date, proposed_json, comment, \
     completed, status, decision_comment, decided_by, decided_at, created_at, updated_at";

/// A terminal decision recorded on a pending request.
#[derive(Debug, Clone)]
pub struct Decision {
    pub status: ChangeRequestStatus,
    pub comment: Option<String>,
    pub decided_by: Option<StaffId>,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeRequestRepository;

impl ChangeRequestRepository {
    pub fn new() -> Self {
        Self
    }

    fn base_select_query() -> String {
        format!("SELECT {} FROM {}", SELECT_COLUMNS, TABLE_NAME)
    }

    pub async fn find_by_id(
        &self,
        db: &PgPool,
        id: ChangeRequestId,
    ) -> Result<ChangeRequest, AppError> {
        let query = format!("{} WHERE id = $1", Self::base_select_query());
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Change request not found".into()))
    }

    /// Locks the row for the rest of the transaction.
    pub async fn find_for_update(
        &self,
        conn: &mut PgConnection,
        id: ChangeRequestId,
    ) -> Result<ChangeRequest, AppError> {
        let query = format!("{} WHERE id = $1 FOR UPDATE", Self::base_select_query());
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Change request not found".into()))
    }

    pub async fn find_pending_for_attendance(
        &self,
        db: &PgPool,
        attendance_id: AttendanceId,
    ) -> Result<Option<ChangeRequest>, AppError> {
        let query = format!(
            "{} WHERE attendance_id = $1 AND status = $2",
            Self::base_select_query()
        );
        let row = sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(attendance_id)
            .bind(ChangeRequestStatus::Pending.db_value())
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    /// Requests filtered by status and staff, oldest first.
    pub async fn list(
        &self,
        db: &PgPool,
        status: Option<ChangeRequestStatus>,
        staff_id: Option<StaffId>,
    ) -> Result<Vec<ChangeRequest>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(Self::base_select_query());
        let mut has_clause = false;
        if let Some(status) = status {
            push_clause(&mut builder, &mut has_clause);
            builder.push("status = ").push_bind(status.db_value());
        }
        if let Some(staff_id) = staff_id {
            push_clause(&mut builder, &mut has_clause);
            builder.push("staff_id = ").push_bind(staff_id);
        }
        builder.push(" ORDER BY created_at ASC, id");
        let rows = builder
            .build_query_as::<ChangeRequest>()
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, db: &PgPool, item: &ChangeRequest) -> Result<ChangeRequest, AppError> {
        let query = format!(
            "INSERT INTO {} (id, attendance_id, staff_id, work_date, proposed_json, comment, \
             completed, status, decision_comment, decided_by, decided_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(item.id)
            .bind(item.attendance_id)
            .bind(item.staff_id)
            .bind(item.work_date)
            .bind(&item.proposed_json)
            .bind(&item.comment)
            .bind(item.completed)
            .bind(item.status.db_value())
            .bind(&item.decision_comment)
            .bind(item.decided_by)
            .bind(item.decided_at)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    /// Moves a pending request to a terminal status.
    ///
    /// Returns `None` when the request is no longer pending.
    pub async fn decide(
        &self,
        conn: &mut PgConnection,
        id: ChangeRequestId,
        decision: &Decision,
    ) -> Result<Option<ChangeRequest>, AppError> {
        let query = format!(
            "UPDATE {} SET status = $2, completed = TRUE, decision_comment = $3, \
             decided_by = $4, decided_at = $5, updated_at = $5 \
             WHERE id = $1 AND status = $6 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .bind(decision.status.db_value())
            .bind(&decision.comment)
            .bind(decision.decided_by)
            .bind(decision.decided_at)
            .bind(ChangeRequestStatus::Pending.db_value())
            .fetch_optional(conn)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_columns_include_completion_marker() {
        assert!(SELECT_COLUMNS.contains("completed"));
        assert!(SELECT_COLUMNS.contains("proposed_json"));
    }
}
