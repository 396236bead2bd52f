use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::response::ApiResponse;
use crate::routes::auth::post::UserDto;
use db::models::user::{Model as User, Role};
use services::sweeper;
use util::{config, state::AppState};

/// Response shape consumed by the scheduler that triggers sweeps; the field
/// names are part of that contract.
#[derive(Serialize)]
pub struct SweepResponse {
    pub success: bool,
    pub message: String,
    pub completed: u64,
    #[serde(rename = "sessionIds")]
    pub session_ids: Vec<Uuid>,
}

/// POST /api/system/sweep
///
/// Completes every active session whose scheduled end has passed.
pub async fn sweep_sessions(State(state): State<AppState>) -> (StatusCode, Json<SweepResponse>) {
    match sweeper::sweep(state.db(), Utc::now()).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SweepResponse {
                success: true,
                message: format!("Swept {} session(s)", outcome.completed),
                completed: outcome.completed,
                session_ids: outcome.session_ids,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "sweep failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SweepResponse {
                    success: false,
                    message: "Sweep failed".to_string(),
                    completed: 0,
                    session_ids: Vec::new(),
                }),
            )
        }
    }
}

/// POST /api/system/bootstrap-admin
///
/// Creates the first admin account from configured credentials. Re-running
/// it is a no-op once the account exists.
pub async fn bootstrap_admin(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Option<UserDto>>>) {
    let db = state.db();
    let email = config::admin_email();
    let username = config::admin_username();
    let password = config::admin_password();

    if email.is_empty() || password.is_empty() {
        return (
            StatusCode::PRECONDITION_FAILED,
            Json(ApiResponse::error("Admin credentials are not configured")),
        );
    }

    match User::find_by_email(db, &email).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(ApiResponse::success(None, "Admin account already exists")),
        ),
        Ok(None) => match User::create(db, &username, &email, &password, Role::Admin).await {
            Ok(user) => {
                tracing::info!(email = %email, "bootstrapped admin account");
                (
                    StatusCode::CREATED,
                    Json(ApiResponse::success(Some(user.into()), "Admin account created")),
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to bootstrap admin");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Failed to create admin account")),
                )
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "failed to check for existing admin");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create admin account")),
            )
        }
    }
}
