use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::response::{ApiResponse, Empty};
use crate::routes::sessions::common::{SessionResponse, load_session, roster_tallies};
use db::models::attendance_record::{self, AttendanceStatus, Classification};
use db::models::enrollment;
use db::models::training_session::{Column as SessionCol, Entity as SessionEntity, SessionStatus};
use db::models::user;
use services::export::{self, ExportRow};
use util::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    /// Fuzzy match on title or description.
    pub q: Option<String>,
    pub status: Option<SessionStatus>,
    pub category_id: Option<i64>,
    /// Field name, `-` prefix for descending. Supports `date`, `title`,
    /// `created_at`.
    pub sort: Option<String>,
}

#[derive(Serialize, Default)]
pub struct ListResponse {
    pub sessions: Vec<SessionResponse>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<ListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100) as u64;

    let mut sel = SessionEntity::find();
    if let Some(s) = q.q.as_ref().filter(|s| !s.trim().is_empty()) {
        sel = sel.filter(
            Condition::any()
                .add(SessionCol::Title.contains(s))
                .add(SessionCol::Description.contains(s)),
        );
    }
    if let Some(status) = q.status {
        sel = sel.filter(SessionCol::Status.eq(status));
    }
    if let Some(category_id) = q.category_id {
        sel = sel.filter(SessionCol::CategoryId.eq(category_id));
    }

    let (field, desc) = match q.sort.as_deref() {
        Some(s) if s.starts_with('-') => (&s[1..], true),
        Some(s) => (s, false),
        None => ("date", false),
    };
    let col = match field {
        "title" => SessionCol::Title,
        "created_at" => SessionCol::CreatedAt,
        _ => SessionCol::ScheduledDate,
    };
    sel = if desc {
        sel.order_by_desc(col)
    } else {
        sel.order_by_asc(col)
    };

    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    let mut sessions = Vec::with_capacity(rows.len());
    for session in rows {
        let (enrolled, counts) = roster_tallies(db, session.id).await;
        sessions.push(SessionResponse::from_parts(session, enrolled, counts));
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            ListResponse {
                sessions,
                page: page as i32,
                per_page: per_page as i32,
                total,
            },
            "Sessions retrieved",
        )),
    )
}

/// GET /api/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    let db = state.db();
    let session = match load_session(db, session_id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let (enrolled, counts) = roster_tallies(db, session_id).await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            SessionResponse::from_parts(session, enrolled, counts),
            "Session retrieved",
        )),
    )
}

#[derive(Serialize)]
pub struct EnrollmentDto {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub assigned_by: i64,
    pub created_at: DateTime<Utc>,
}

/// GET /api/sessions/{session_id}/enrollments
pub async fn list_enrollments(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse<Vec<EnrollmentDto>>>) {
    let db = state.db();
    if let Err(resp) = load_session::<Vec<EnrollmentDto>>(db, session_id).await {
        return resp;
    }

    match enrollment::Entity::find()
        .filter(enrollment::Column::SessionId.eq(session_id))
        .find_also_related(user::Entity)
        .all(db)
        .await
    {
        Ok(rows) => {
            let out = rows
                .into_iter()
                .filter_map(|(e, u)| {
                    u.map(|u| EnrollmentDto {
                        user_id: e.user_id,
                        username: u.username,
                        email: u.email,
                        assigned_by: e.assigned_by,
                        created_at: e.created_at,
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(out, "Enrollments retrieved")),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to list enrollments");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list enrollments")),
            )
        }
    }
}

#[derive(Serialize)]
pub struct RecordDto {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub status: AttendanceStatus,
    pub classification: Option<Classification>,
    pub joined_at: Option<DateTime<Utc>>,
}

/// GET /api/sessions/{session_id}/records
pub async fn list_records(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse<Vec<RecordDto>>>) {
    let db = state.db();
    if let Err(resp) = load_session::<Vec<RecordDto>>(db, session_id).await {
        return resp;
    }

    match joined_records(db, session_id).await {
        Ok(out) => (
            StatusCode::OK,
            Json(ApiResponse::success(out, "Attendance records retrieved")),
        ),
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to list records");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list attendance records")),
            )
        }
    }
}

async fn joined_records(
    db: &sea_orm::DatabaseConnection,
    session_id: Uuid,
) -> Result<Vec<RecordDto>, sea_orm::DbErr> {
    let rows = attendance_record::Entity::find()
        .filter(attendance_record::Column::SessionId.eq(session_id))
        .find_also_related(user::Entity)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(r, u)| {
            u.map(|u| RecordDto {
                user_id: r.user_id,
                username: u.username,
                email: u.email,
                status: r.status,
                classification: r.classification,
                joined_at: r.joined_at,
            })
        })
        .collect())
}

/// GET /api/sessions/{session_id}/records/export
///
/// Streams the roster as a CSV attachment.
pub async fn export_records(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Response {
    let db = state.db();
    let session = match load_session::<Empty>(db, session_id).await {
        Ok(s) => s,
        Err(resp) => return resp.into_response(),
    };

    let records = match joined_records(db, session_id).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to export records");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error("Failed to export attendance")),
            )
                .into_response();
        }
    };
    let counts = attendance_record::Model::counts_for_session(db, session_id)
        .await
        .unwrap_or_default();

    let rows: Vec<ExportRow> = records
        .into_iter()
        .map(|r| ExportRow {
            name: r.username,
            email: r.email,
            status: r.status.to_string(),
            joined_at: r.joined_at,
        })
        .collect();

    let filename = export::export_filename(&session);
    let csv = export::render_csv(&session, &counts, &rows);

    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response()
}
