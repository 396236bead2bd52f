use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::response::{ApiResponse, Empty};
use crate::ws::attendance::{SessionDeletedPayload, emit_session_deleted};
use db::models::training_session::Entity as SessionEntity;
use util::state::AppState;

/// DELETE /api/sessions/{session_id}
///
/// Tokens, enrollments and attendance records cascade with the session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    match SessionEntity::delete_by_id(session_id).exec(state.db()).await {
        Ok(res) if res.rows_affected == 0 => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Session not found")),
        ),
        Ok(_) => {
            emit_session_deleted(state.ws(), SessionDeletedPayload { session_id }).await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(Empty, "Session deleted")),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to delete session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to delete session")),
            )
        }
    }
}
