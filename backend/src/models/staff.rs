//! Models that represent staff accounts, their roles and work classification.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::types::StaffId;
use crate::validation::rules::{validate_not_blank, validate_password, validate_username};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a staff member who records attendance.
pub struct Staff {
    /// Unique identifier for the staff member.
    pub id: StaffId,
    /// Immutable username used for login.
    pub username: String,
    /// Argon2 hash of the staff member's password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable full name.
    pub full_name: String,
    pub email: Option<String>,
    /// Role describing the staff member's privileges.
    pub role: StaffRole,
    /// Whether the staff member follows the weekday calendar or a shift plan.
    pub work_type: WorkType,
    /// First day the staff member is expected to record attendance.
    pub usage_start_date: Option<NaiveDate>,
    /// Disabled accounts cannot log in.
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Staff {
    pub fn new(
        username: String,
        password_hash: String,
        full_name: String,
        role: StaffRole,
        work_type: WorkType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: StaffId::new(),
            username,
            password_hash,
            full_name,
            email: None,
            role,
            work_type,
            usage_start_date: None,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, StaffRole::Admin | StaffRole::Owner)
    }

    /// Guests can browse but never write attendance.
    pub fn can_record_attendance(&self) -> bool {
        !matches!(self.role, StaffRole::Guest)
    }

    pub fn is_shift_worker(&self) -> bool {
        matches!(self.work_type, WorkType::Shift)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported staff roles stored in the database.
pub enum StaffRole {
    /// Full administrative access.
    Admin,
    /// Regular employee.
    #[default]
    Staff,
    /// Operates shared terminals; records attendance like staff.
    Operator,
    /// Read-only access.
    Guest,
    /// Account owner; treated as an administrator.
    Owner,
}

impl StaffRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Staff => "staff",
            StaffRole::Operator => "operator",
            StaffRole::Guest => "guest",
            StaffRole::Owner => "owner",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "admin" => Some(StaffRole::Admin),
            "staff" => Some(StaffRole::Staff),
            "operator" => Some(StaffRole::Operator),
            "guest" => Some(StaffRole::Guest),
            "owner" => Some(StaffRole::Owner),
            _ => None,
        }
    }
}

impl Serialize for StaffRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StaffRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // tolerate legacy casings such as "Admin" or "STAFF"
        StaffRole::parse(&s).ok_or_else(|| {
            serde::de::Error::unknown_variant(
                &s,
                &["admin", "staff", "operator", "guest", "owner"],
            )
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Works Monday to Friday; weekends count as days off.
    #[default]
    Weekday,
    /// Works a shift plan; only calendar holidays count as days off.
    Shift,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Weekday => "weekday",
            WorkType::Shift => "shift",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for creating a new staff account.
pub struct CreateStaff {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, code = "full_name_length")
    )]
    pub full_name: String,
    #[validate(email(code = "email_invalid"))]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: StaffRole,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub usage_start_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for updating portions of an existing staff account.
pub struct UpdateStaff {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, code = "full_name_length")
    )]
    pub full_name: Option<String>,
    #[validate(email(code = "email_invalid"))]
    pub email: Option<String>,
    pub role: Option<StaffRole>,
    pub work_type: Option<WorkType>,
    pub usage_start_date: Option<NaiveDate>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Credentials submitted by a staff member attempting to authenticate.
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub staff: StaffResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Public view of a staff account.
pub struct StaffResponse {
    pub id: StaffId,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: StaffRole,
    pub work_type: WorkType,
    pub usage_start_date: Option<NaiveDate>,
    pub enabled: bool,
}

impl From<Staff> for StaffResponse {
    fn from(staff: Staff) -> Self {
        StaffResponse {
            id: staff.id,
            username: staff.username,
            full_name: staff.full_name,
            email: staff.email,
            role: staff.role,
            work_type: staff.work_type,
            usage_start_date: staff.usage_start_date,
            enabled: staff.enabled,
        }
    }
}
