//! Staff repository.

use crate::error::AppError;
use crate::models::staff::Staff;
use crate::repositories::repository::Repository;
use crate::types::StaffId;
use sqlx::PgPool;

const TABLE_NAME: &str = "staff";
const SELECT_COLUMNS: &str = "id, username, password_hash, full_name, email, role, work_type, \
     usage_start_date, enabled, created_at, updated_at";

#[derive(Debug, Default, Clone, Copy)]
pub struct StaffRepository;

impl StaffRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_username(
        &self,
        db: &PgPool,
        username: &str,
    ) -> Result<Option<Staff>, AppError> {
        let query = format!("{} WHERE username = $1", Self::base_select_query());
        let row = sqlx::query_as::<_, Staff>(&query)
            .bind(username)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    pub async fn find_optional(&self, db: &PgPool, id: StaffId) -> Result<Option<Staff>, AppError> {
        let query = format!("{} WHERE id = $1", Self::base_select_query());
        let row = sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    fn base_select_query() -> String {
        format!("SELECT {} FROM {}", SELECT_COLUMNS, TABLE_NAME)
    }
}

impl Repository<Staff> for StaffRepository {
    const TABLE: &'static str = TABLE_NAME;
    type Id = StaffId;

    async fn find_all(&self, db: &PgPool) -> Result<Vec<Staff>, AppError> {
        let query = format!("{} ORDER BY username ASC", Self::base_select_query());
        let rows = sqlx::query_as::<_, Staff>(&query).fetch_all(db).await?;
        Ok(rows)
    }

    async fn find_by_id(&self, db: &PgPool, id: StaffId) -> Result<Staff, AppError> {
        self.find_optional(db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff not found".into()))
    }

    async fn create(&self, db: &PgPool, item: &Staff) -> Result<Staff, AppError> {
        let query = format!(
            "INSERT INTO {} (id, username, password_hash, full_name, email, role, work_type, \
             usage_start_date, enabled, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Staff>(&query)
            .bind(item.id)
            .bind(&item.username)
            .bind(&item.password_hash)
            .bind(&item.full_name)
            .bind(&item.email)
            .bind(item.role.as_str())
            .bind(item.work_type.as_str())
            .bind(item.usage_start_date)
            .bind(item.enabled)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(db)
            .await?;
        Ok(row)
    }

    async fn update(&self, db: &PgPool, item: &Staff) -> Result<Staff, AppError> {
        let query = format!(
            "UPDATE {} SET full_name = $2, email = $3, role = $4, work_type = $5, \
             usage_start_date = $6, enabled = $7, password_hash = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Staff>(&query)
            .bind(item.id)
            .bind(&item.full_name)
            .bind(&item.email)
            .bind(item.role.as_str())
            .bind(item.work_type.as_str())
            .bind(item.usage_start_date)
            .bind(item.enabled)
            .bind(&item.password_hash)
            .bind(item.updated_at)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff not found".into()))?;
        Ok(row)
    }
}
