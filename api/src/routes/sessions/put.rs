use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::response::ApiResponse;
use crate::routes::sessions::common::{SessionResponse, load_session, roster_tallies};
use crate::ws::attendance::{SessionUpdatedPayload, emit_session_updated};
use db::{
    DomainError,
    models::attendance_record::{self, AttendanceStatus, Classification},
    models::training_session::SessionStatus,
};
use util::state::AppState;

#[derive(Deserialize)]
pub struct EditSessionReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub scheduled_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Requested lifecycle transition, applied after the field edits.
    pub status: Option<SessionStatus>,
}

/// PUT /api/sessions/{session_id}
///
/// Edits schedule fields and optionally transitions the lifecycle status.
/// Illegal transitions (anything other than scheduled → active → completed,
/// or cancelling a non-terminal session) are rejected.
pub async fn edit_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<EditSessionReq>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    let db = state.db();
    let session = match load_session(db, session_id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let start = body.start_time.unwrap_or(session.start_time);
    let end = body.end_time.unwrap_or(session.end_time);
    if end <= start {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Session end time must be after start time")),
        );
    }

    let mut active = session.into_active_model();
    if let Some(title) = body.title.as_ref().filter(|t| !t.trim().is_empty()) {
        active.title = Set(title.trim().to_owned());
    }
    if let Some(desc) = body.description {
        active.description = Set(Some(desc));
    }
    if let Some(category_id) = body.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(date) = body.scheduled_date {
        active.scheduled_date = Set(date);
    }
    active.start_time = Set(start);
    active.end_time = Set(end);
    active.updated_at = Set(Utc::now());

    let updated = match active.update(db).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to update session");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update session")),
            );
        }
    };

    let updated = match body.status {
        Some(to) => match updated.transition(db, to, Utc::now()).await {
            Ok(s) => {
                emit_session_updated(
                    state.ws(),
                    SessionUpdatedPayload {
                        session_id,
                        status: s.status,
                    },
                )
                .await;
                s
            }
            Err(DomainError::InvalidState(msg)) => {
                return (StatusCode::CONFLICT, Json(ApiResponse::error(msg)));
            }
            Err(e) => {
                tracing::error!(error = %e, session_id = %session_id, "transition failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Failed to update session status")),
                );
            }
        },
        None => updated,
    };

    let (enrolled, counts) = roster_tallies(db, session_id).await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            SessionResponse::from_parts(updated, enrolled, counts),
            "Session updated",
        )),
    )
}

#[derive(Deserialize)]
pub struct OverrideRecordReq {
    pub status: AttendanceStatus,
    pub classification: Option<Classification>,
}

/// PUT /api/sessions/{session_id}/records/{user_id}
///
/// Administrative correction of a record, e.g. marking a no-show absent or a
/// mid-session leaver partial. Bypasses the token checks that gate scans.
pub async fn override_record(
    State(state): State<AppState>,
    Path((session_id, user_id)): Path<(Uuid, i64)>,
    Json(body): Json<OverrideRecordReq>,
) -> (StatusCode, Json<ApiResponse<Option<attendance_record::Model>>>) {
    let db = state.db();
    if let Err(resp) = load_session::<Option<attendance_record::Model>>(db, session_id).await {
        return resp;
    }

    match attendance_record::Model::override_status(
        db,
        session_id,
        user_id,
        body.status,
        body.classification,
    )
    .await
    {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(record), "Attendance record updated")),
        ),
        Err(DomainError::NotFound(what)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("{what} not found"))),
        ),
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, user_id, "override failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update attendance record")),
            )
        }
    }
}
