use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde::Deserialize;

use crate::response::ApiResponse;
use crate::routes::auth::post::UserDto;
use db::models::user::{Entity as UserEntity, Role};
use util::state::AppState;

#[derive(Deserialize)]
pub struct EditUserReq {
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// PUT /api/users/{user_id}
pub async fn edit_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<EditUserReq>,
) -> (StatusCode, Json<ApiResponse<UserDto>>) {
    let db = state.db();

    let user = match UserEntity::find_by_id(user_id).one(db).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("User not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, user_id, "failed to load user");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update user")),
            );
        }
    };

    let mut active = user.into_active_model();
    if let Some(email) = body.email.as_ref().filter(|e| !e.trim().is_empty()) {
        active.email = Set(email.trim().to_owned());
    }
    if let Some(role) = body.role {
        active.role = Set(role);
    }
    active.updated_at = Set(Utc::now());

    match active.update(db).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(updated.into(), "User updated")),
        ),
        Err(e) => {
            tracing::error!(error = %e, user_id, "failed to update user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update user")),
            )
        }
    }
}
