use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::response::ApiResponse;
use db::{DomainError, models::category::Model as Category};
use util::state::AppState;

#[derive(Deserialize)]
pub struct CreateCategoryReq {
    pub name: String,
    pub description: Option<String>,
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryReq>,
) -> (StatusCode, Json<ApiResponse<Option<Category>>>) {
    let name = body.name.trim();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Category name is required")),
        );
    }

    match Category::create(state.db(), name, body.description.as_deref()).await {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(Some(row), "Category created")),
        ),
        Err(DomainError::Conflict(msg)) => (StatusCode::CONFLICT, Json(ApiResponse::error(msg))),
        Err(e) => {
            tracing::error!(error = %e, "failed to create category");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create category")),
            )
        }
    }
}
