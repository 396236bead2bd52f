use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::EntityTrait;

use crate::response::{ApiResponse, Empty};
use db::models::category::Entity as CategoryEntity;
use util::state::AppState;

/// DELETE /api/categories/{category_id}
///
/// Sessions under the category cascade with it.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    match CategoryEntity::delete_by_id(category_id).exec(state.db()).await {
        Ok(res) if res.rows_affected == 0 => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Category not found")),
        ),
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success(Empty, "Category deleted")),
        ),
        Err(e) => {
            tracing::error!(error = %e, category_id, "failed to delete category");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to delete category")),
            )
        }
    }
}
