use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use db::models::attendance_record::{AttendanceCounts, AttendanceStatus, Classification};
use db::models::training_session::SessionStatus;

/// Emitted whenever a scan lands (first scan or re-scan). Carries the fresh
/// roster tallies so listeners never have to re-query to stay consistent.
#[derive(Serialize)]
pub struct AttendanceMarkedPayload {
    pub session_id: Uuid,
    pub user_id: i64,
    pub username: String,
    pub status: AttendanceStatus,
    pub classification: Classification,
    pub joined_at: Option<DateTime<Utc>>,
    pub repeat: bool,
    pub counts: AttendanceCounts,
}

#[derive(Serialize)]
pub struct SessionUpdatedPayload {
    pub session_id: Uuid,
    pub status: SessionStatus,
}

#[derive(Serialize)]
pub struct SessionDeletedPayload {
    pub session_id: Uuid,
}
