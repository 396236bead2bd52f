use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::EntityTrait;

use crate::response::{ApiResponse, Empty};
use db::models::user::Entity as UserEntity;
use util::state::AppState;

/// DELETE /api/users/{user_id}
///
/// Enrollments and attendance records cascade with the row.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    let db = state.db();

    match UserEntity::delete_by_id(user_id).exec(db).await {
        Ok(res) if res.rows_affected == 0 => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("User not found")),
        ),
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success(Empty, "User deleted")),
        ),
        Err(e) => {
            tracing::error!(error = %e, user_id, "failed to delete user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to delete user")),
            )
        }
    }
}
