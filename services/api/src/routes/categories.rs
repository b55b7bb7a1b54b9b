//! Category endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::category::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::state::AppState;

/// List all categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let categories = state.categories.list().await?;
    Ok(Json(json!({ "success": true, "data": categories })))
}

/// Fetch one category
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": category })))
}

/// Create a category; names are unique ignoring case
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }

    if state.categories.name_taken(name, None).await? {
        return Err(ApiError::Conflict(
            "A category with this name already exists".to_string(),
        ));
    }

    let category = state.categories.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": category })),
    ))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Name cannot be empty".to_string()));
        }
        if state.categories.name_taken(name, Some(id)).await? {
            return Err(ApiError::Conflict(
                "A category with this name already exists".to_string(),
            ));
        }
    }

    let category = state
        .categories
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": category })))
}

/// Delete a category and its hosted image
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    state.categories.delete(id).await?;

    if let Some(image) = &category.image {
        if let Err(e) = state.image_store.delete(&image.hosted_id).await {
            warn!("Failed to delete category image {}: {}", image.hosted_id, e);
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Category deleted",
    })))
}
