use axum::{Json, extract::State, http::StatusCode};
use sea_orm::{EntityTrait, QueryOrder};

use crate::response::ApiResponse;
use db::models::category::{Column as CategoryCol, Entity as CategoryEntity, Model as Category};
use util::state::AppState;

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<Category>>>) {
    match CategoryEntity::find()
        .order_by_asc(CategoryCol::Name)
        .all(state.db())
        .await
    {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(rows, "Categories retrieved")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to list categories");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list categories")),
            )
        }
    }
}
