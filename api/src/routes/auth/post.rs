use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::{auth::generate_jwt, response::ApiResponse};
use db::{
    DomainError,
    models::user::{Model as User, Role},
};
use util::state::AppState;

#[derive(Deserialize)]
pub struct RegisterReq {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Default)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: String,
    pub user: Option<UserDto>,
}

#[derive(Serialize, Default)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
        }
    }
}

/// POST /api/auth/register
///
/// Self-signup always creates a trainee; trainers and admins are created by
/// an admin through `/users`.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterReq>,
) -> (StatusCode, Json<ApiResponse<AuthResponse>>) {
    let db = state.db();

    if body.username.trim().is_empty() || body.email.trim().is_empty() || body.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "Username, email and a password of at least 8 characters are required",
            )),
        );
    }

    match User::create(db, body.username.trim(), body.email.trim(), &body.password, Role::Trainee)
        .await
    {
        Ok(user) => {
            let (token, expires_at) = generate_jwt(user.id, user.role);
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    AuthResponse {
                        token,
                        expires_at,
                        user: Some(user.into()),
                    },
                    "Account created",
                )),
            )
        }
        Err(DomainError::Conflict(msg)) => {
            (StatusCode::CONFLICT, Json(ApiResponse::error(msg)))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to register user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create account")),
            )
        }
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginReq>,
) -> (StatusCode, Json<ApiResponse<AuthResponse>>) {
    let db = state.db();

    match User::verify_credentials(db, body.email.trim(), &body.password).await {
        Ok(Some(user)) => {
            let (token, expires_at) = generate_jwt(user.id, user.role);
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    AuthResponse {
                        token,
                        expires_at,
                        user: Some(user.into()),
                    },
                    "Logged in",
                )),
            )
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid email or password")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "login query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Login failed")),
            )
        }
    }
}
