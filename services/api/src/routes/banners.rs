//! Banner endpoints
//!
//! Every read path sweeps expired banners first, so the public surface
//! never serves a stale one.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::Principal;
use crate::models::banner::{CreateBannerRequest, UpdateBannerRequest, is_valid_visibility};
use crate::state::AppState;

/// Public listing: visible, unexpired banners
pub async fn list_visible_banners(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.banners.sweep_expired().await?;
    let banners = state.banners.list(true).await?;
    Ok(Json(json!({ "success": true, "data": banners })))
}

/// Admin listing: every banner, expired ones included
pub async fn list_all_banners(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.banners.sweep_expired().await?;
    let banners = state.banners.list(false).await?;
    Ok(Json(json!({ "success": true, "data": banners })))
}

/// Fetch one banner (public); expired banners read as absent
pub async fn get_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.banners.sweep_expired().await?;

    let banner = state
        .banners
        .find_by_id(id)
        .await?
        .filter(|b| b.is_visible)
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": banner })))
}

/// Create a banner for a vendor
pub async fn create_banner(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateBannerRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if !is_valid_visibility(payload.visibility_days) {
        return Err(ApiError::Validation(
            "Visibility must be one of 7, 10, 12, 15, 17, or 30 days".to_string(),
        ));
    }

    if state.vendors.find_by_id(payload.vendor_id).await?.is_none() {
        return Err(ApiError::Validation("Unknown vendor".to_string()));
    }

    let created_by = match &principal {
        Principal::Admin(admin) => Some(admin.id),
        Principal::Vendor(vendor) => Some(vendor.id),
    };

    let banner = state.banners.create(&payload, created_by).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": banner })),
    ))
}

/// Update a banner; a new visibility term restarts the expiry clock
pub async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBannerRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(days) = payload.visibility_days {
        if !is_valid_visibility(days) {
            return Err(ApiError::Validation(
                "Visibility must be one of 7, 10, 12, 15, 17, or 30 days".to_string(),
            ));
        }
    }

    let banner = state
        .banners
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": banner })))
}

/// Delete a banner and its hosted image
pub async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let hosted_id = state
        .banners
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;

    if let Err(e) = state.image_store.delete(&hosted_id).await {
        warn!("Failed to delete banner image {}: {}", hosted_id, e);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Banner deleted",
    })))
}

/// Aggregate banner counts (admin)
pub async fn banner_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.banners.sweep_expired().await?;
    let stats = state.banners.stats().await?;
    Ok(Json(json!({ "success": true, "data": stats })))
}
