use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::response::ApiResponse;
use crate::routes::auth::post::UserDto;
use db::{
    DomainError,
    models::user::{Model as User, Role},
};
use util::state::AppState;

#[derive(Deserialize)]
pub struct CreateUserReq {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// POST /api/users
///
/// Admin creation path; unlike self-signup this can assign any role.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserReq>,
) -> (StatusCode, Json<ApiResponse<UserDto>>) {
    let db = state.db();

    if body.username.trim().is_empty() || body.email.trim().is_empty() || body.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "Username, email and a password of at least 8 characters are required",
            )),
        );
    }

    match User::create(db, body.username.trim(), body.email.trim(), &body.password, body.role).await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(user.into(), "User created")),
        ),
        Err(DomainError::Conflict(msg)) => (StatusCode::CONFLICT, Json(ApiResponse::error(msg))),
        Err(e) => {
            tracing::error!(error = %e, "failed to create user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create user")),
            )
        }
    }
}
