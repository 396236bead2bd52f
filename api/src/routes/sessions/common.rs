//! Shared DTOs and helpers for the session routes.

use axum::{Json, http::StatusCode};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use crate::response::ApiResponse;
use db::models::attendance_record::{self, AttendanceCounts};
use db::models::enrollment;
use db::models::training_session::{Model as Session, SessionStatus};

/// Session as returned by the API, with roster tallies attached.
#[derive(Serialize, Default)]
pub struct SessionResponse {
    pub id: Option<Uuid>,
    pub category_id: i64,
    pub trainer_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: Option<SessionStatus>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub enrolled: u64,
    pub present: u64,
    pub late: u64,
}

impl SessionResponse {
    pub fn from_parts(session: Session, enrolled: u64, counts: AttendanceCounts) -> Self {
        Self {
            id: Some(session.id),
            category_id: session.category_id,
            trainer_id: session.trainer_id,
            title: session.title,
            description: session.description,
            scheduled_date: Some(session.scheduled_date),
            start_time: Some(session.start_time),
            end_time: Some(session.end_time),
            status: Some(session.status),
            actual_start_time: session.actual_start_time,
            actual_end_time: session.actual_end_time,
            enrolled,
            present: counts.present,
            late: counts.late,
        }
    }
}

/// Enrollment count plus present/late tallies for one session. Query
/// failures degrade to zeros rather than failing the surrounding read.
pub async fn roster_tallies(
    db: &DatabaseConnection,
    session_id: Uuid,
) -> (u64, AttendanceCounts) {
    let enrolled = enrollment::Entity::find()
        .filter(enrollment::Column::SessionId.eq(session_id))
        .count(db)
        .await
        .unwrap_or(0);
    let counts = attendance_record::Model::counts_for_session(db, session_id)
        .await
        .unwrap_or_default();
    (enrolled, counts)
}

/// Loads a session or produces the standard 404 / 500 response pair.
pub async fn load_session<T: Serialize + Default>(
    db: &DatabaseConnection,
    session_id: Uuid,
) -> Result<Session, (StatusCode, Json<ApiResponse<T>>)> {
    match Session::find_by_id(db, session_id).await {
        Ok(Some(s)) => Ok(s),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Session not found")),
        )),
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to load session");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to load session")),
            ))
        }
    }
}
