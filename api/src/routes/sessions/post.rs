use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::routes::sessions::common::{SessionResponse, load_session};
use crate::ws::attendance::{AttendanceMarkedPayload, emit_attendance_marked};
use db::{
    DomainError,
    models::attendance_record::{self, AttendanceCounts, AttendanceStatus, Classification},
    models::attendance_token,
    models::enrollment,
    models::training_session::Model as Session,
    models::user,
};
use services::qr;
use util::{config, state::AppState};

#[derive(Deserialize)]
pub struct CreateSessionReq {
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<CreateSessionReq>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    let db = state.db();

    if body.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Session title is required")),
        );
    }

    match Session::create(
        db,
        body.category_id,
        claims.sub,
        body.title.trim(),
        body.description.as_deref(),
        body.scheduled_date,
        body.start_time,
        body.end_time,
    )
    .await
    {
        Ok(session) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                SessionResponse::from_parts(session, 0, AttendanceCounts::default()),
                "Session created",
            )),
        ),
        Err(DomainError::InvalidState(msg)) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg)))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create session")),
            )
        }
    }
}

#[derive(Serialize, Default)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// Full scan URL to encode into the QR image.
    pub qr_payload: String,
}

/// POST /api/sessions/{session_id}/token
///
/// Issues a fresh attendance token, invalidating any previous one.
pub async fn issue_token(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse<TokenResponse>>) {
    let db = state.db();
    let session = match load_session(db, session_id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let ttl = config::attendance_token_ttl_seconds();
    match attendance_token::Model::issue(db, &session, ttl, Utc::now()).await {
        Ok(row) => {
            let qr_payload = qr::encode_payload(&config::frontend_url(), &row.token, session_id);
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    TokenResponse {
                        token: row.token,
                        expires_at: Some(row.expires_at),
                        qr_payload,
                    },
                    "Attendance token issued",
                )),
            )
        }
        Err(DomainError::InvalidState(msg)) => {
            (StatusCode::CONFLICT, Json(ApiResponse::error(msg)))
        }
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to issue token");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to issue attendance token")),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct ScanReq {
    pub token: String,
}

#[derive(Serialize, Default)]
pub struct ScanResponse {
    pub status: Option<AttendanceStatus>,
    pub classification: Option<Classification>,
    pub repeat: bool,
}

/// POST /api/sessions/{session_id}/scan
///
/// Records the caller's attendance from a scanned QR token and fans the
/// update out on the session's WebSocket topic.
pub async fn scan(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<ScanReq>,
) -> (StatusCode, Json<ApiResponse<ScanResponse>>) {
    let db = state.db();
    let session = match load_session(db, session_id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let now = Utc::now();
    let grace = config::attendance_grace_minutes();
    let recorded =
        match attendance_record::Model::record(db, &session, &body.token, claims.sub, now, grace)
            .await
        {
            Ok(r) => r,
            Err(DomainError::TokenExpired) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error("Attendance code expired or invalid")),
                );
            }
            Err(DomainError::InvalidState(msg)) => {
                return (StatusCode::CONFLICT, Json(ApiResponse::error(msg)));
            }
            Err(e) => {
                tracing::error!(error = %e, session_id = %session_id, "scan failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Failed to record attendance")),
                );
            }
        };

    let counts = attendance_record::Model::counts_for_session(db, session_id)
        .await
        .unwrap_or_default();
    let username = user::Entity::find_by_id(claims.sub)
        .one(db)
        .await
        .ok()
        .flatten()
        .map(|u| u.username)
        .unwrap_or_default();

    emit_attendance_marked(
        state.ws(),
        AttendanceMarkedPayload {
            session_id,
            user_id: claims.sub,
            username,
            status: recorded.record.status,
            classification: recorded.classification,
            joined_at: recorded.record.joined_at,
            repeat: recorded.repeat,
            counts,
        },
    )
    .await;

    let message = if recorded.repeat {
        "Attendance already recorded"
    } else {
        match recorded.classification {
            Classification::Late => "Attendance recorded (late)",
            _ => "Attendance recorded",
        }
    };
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            ScanResponse {
                status: Some(recorded.record.status),
                classification: Some(recorded.classification),
                repeat: recorded.repeat,
            },
            message,
        )),
    )
}

#[derive(Deserialize, Default)]
pub struct EnrollReq {
    /// Omitted for self-enrollment; admins may enroll someone else.
    pub user_id: Option<i64>,
}

/// POST /api/sessions/{session_id}/enrollments
pub async fn enroll(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
    body: Option<Json<EnrollReq>>,
) -> (StatusCode, Json<ApiResponse<Option<enrollment::Model>>>) {
    let db = state.db();
    if let Err(resp) = load_session::<Option<enrollment::Model>>(db, session_id).await {
        return resp;
    }

    let target = body.and_then(|Json(b)| b.user_id).unwrap_or(claims.sub);
    if target != claims.sub && !claims.is_admin() {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Only admins can enroll other users")),
        );
    }

    match enrollment::Model::enroll(db, session_id, target, claims.sub).await {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(Some(row), "Enrolled")),
        ),
        Err(DomainError::Conflict(msg)) => (StatusCode::CONFLICT, Json(ApiResponse::error(msg))),
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to enroll");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to enroll")),
            )
        }
    }
}
