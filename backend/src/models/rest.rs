//! Models that capture rest (break) intervals within an attendance record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{AttendanceId, RestId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Persistent representation of a single rest interval.
pub struct Rest {
    /// Unique identifier for the rest interval.
    pub id: RestId,
    /// Owning attendance record.
    pub attendance_id: AttendanceId,
    /// Timestamp when the rest started.
    pub start_time: Option<DateTime<Utc>>,
    /// Timestamp when the rest ended, if closed.
    pub end_time: Option<DateTime<Utc>>,
    /// Insertion order within the attendance record.
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rest {
    /// Creates a new rest that starts immediately.
    pub fn start(attendance_id: AttendanceId, position: i32, start: DateTime<Utc>) -> Self {
        Self {
            id: RestId::new(),
            attendance_id,
            start_time: Some(start),
            end_time: None,
            position,
            created_at: start,
            updated_at: start,
        }
    }

    /// Builds a rest from an explicit interval, as submitted by admins or change requests.
    pub fn from_interval(attendance_id: AttendanceId, position: i32, interval: &RestInterval) -> Self {
        let now = Utc::now();
        Self {
            id: RestId::new(),
            attendance_id,
            start_time: interval.start_time,
            end_time: interval.end_time,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn interval(&self) -> RestInterval {
        RestInterval {
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// The start/end pair of a rest without persistence metadata.
///
/// Both bounds are optional: a rest that is still running has no end, and an
/// interval with neither bound is an empty placeholder that every derivation skips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RestInterval {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl RestInterval {
    pub fn new(start_time: Option<DateTime<Utc>>, end_time: Option<DateTime<Utc>>) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none()
    }

    /// Returns `true` while the rest has begun but not ended.
    pub fn is_open(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// API-friendly representation of a rest interval.
pub struct RestResponse {
    pub id: RestId,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Length of a closed rest in minutes.
    pub duration_minutes: Option<i64>,
}

impl From<Rest> for RestResponse {
    fn from(rest: Rest) -> Self {
        let duration_minutes = match (rest.start_time, rest.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_minutes().max(0)),
            _ => None,
        };
        RestResponse {
            id: rest.id,
            start_time: rest.start_time,
            end_time: rest.end_time,
            duration_minutes,
        }
    }
}
