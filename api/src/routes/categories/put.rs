use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde::Deserialize;

use crate::response::ApiResponse;
use db::models::category::{Entity as CategoryEntity, Model as Category};
use util::state::AppState;

#[derive(Deserialize)]
pub struct EditCategoryReq {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// PUT /api/categories/{category_id}
pub async fn edit_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(body): Json<EditCategoryReq>,
) -> (StatusCode, Json<ApiResponse<Option<Category>>>) {
    let db = state.db();

    let category = match CategoryEntity::find_by_id(category_id).one(db).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Category not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, category_id, "failed to load category");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update category")),
            );
        }
    };

    let mut active = category.into_active_model();
    if let Some(name) = body.name.as_ref().filter(|n| !n.trim().is_empty()) {
        active.name = Set(name.trim().to_owned());
    }
    if let Some(desc) = body.description {
        active.description = Set(Some(desc));
    }

    match active.update(db).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(updated), "Category updated")),
        ),
        Err(e) => {
            tracing::error!(error = %e, category_id, "failed to update category");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to update category")),
            )
        }
    }
}
