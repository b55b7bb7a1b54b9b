//! Product endpoints: public catalog, vendor management, admin moderation

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::Principal;
use crate::models::Paginated;
use crate::models::Pagination;
use crate::models::product::{
    CreateProductRequest, Product, ProductQuery, SetProductImageRequest, UpdateProductRequest,
};
use crate::state::AppState;
use crate::validation::slugify;

fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

fn validate_product_payload(title: &str, price: f64) -> Result<(), ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if trimmed.len() > 200 {
        return Err(ApiError::Validation(
            "Title cannot exceed 200 characters".to_string(),
        ));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Combined listing parameters
#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(flatten)]
    pub query: ProductQuery,
}

/// Public catalog: approved, active products only
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> ApiResult<impl IntoResponse> {
    let (products, total) = state
        .products
        .list(&params.query, &params.pagination, true)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": Paginated::new(products, total, &params.pagination),
    })))
}

/// Whether anonymous callers may see a product
fn publicly_visible(product: &Product) -> bool {
    product.is_approved && product.is_active
}

/// Whether a vendor's product count has reached its quota
pub fn quota_reached(count: i64, limit: i32) -> bool {
    count >= limit as i64
}

/// Fetch a product by ID (public).
///
/// Unmoderated and deactivated products read as absent; views are only
/// counted for visible ones.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .filter(publicly_visible)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    state.products.increment_views(product.id).await?;

    Ok(Json(json!({ "success": true, "data": product })))
}

/// Fetch a product by slug (public)
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .products
        .find_by_slug(&slug)
        .await?
        .filter(publicly_visible)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    state.products.increment_views(product.id).await?;

    Ok(Json(json!({ "success": true, "data": product })))
}

fn current_vendor(principal: &Principal) -> Result<&crate::models::vendor::Vendor, ApiError> {
    match principal {
        Principal::Vendor(vendor) => Ok(vendor),
        Principal::Admin(_) => Err(ApiError::Forbidden("Vendor access required".to_string())),
    }
}

/// List the caller's own products, including unapproved ones
pub async fn list_own_products(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ProductListParams>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;

    let query = ProductQuery {
        vendor_id: Some(vendor.id),
        ..params.query
    };
    let (products, total) = state.products.list(&query, &params.pagination, false).await?;

    Ok(Json(json!({
        "success": true,
        "data": Paginated::new(products, total, &params.pagination),
    })))
}

/// Create a product, subject to the vendor's quota
pub async fn create_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;
    validate_product_payload(&payload.title, payload.price)?;

    if state.categories.find_by_id(payload.category_id).await?.is_none() {
        return Err(ApiError::Validation("Unknown category".to_string()));
    }

    let count = state.products.count_for_vendor(vendor.id).await?;
    if quota_reached(count, vendor.max_product_limit) {
        return Err(ApiError::Forbidden(format!(
            "Product limit of {} reached",
            vendor.max_product_limit
        )));
    }

    let slug = slugify(&payload.title, now_millis());
    let product = state.products.create(vendor.id, &slug, &payload).await?;

    info!("Product created: {} ({})", product.title, product.slug);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": product })),
    ))
}

async fn owned_product(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> Result<Product, ApiError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    principal.may_access_vendor(product.vendor_id)?;
    Ok(product)
}

/// Update a product; title or description edits reset approval
pub async fn update_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let product = owned_product(&state, &principal, id).await?;

    if let Some(title) = &payload.title {
        validate_product_payload(title, payload.price.unwrap_or(0.0))?;
    } else if let Some(price) = payload.price {
        validate_product_payload(&product.title, price)?;
    }

    if let Some(category_id) = payload.category_id {
        if state.categories.find_by_id(category_id).await?.is_none() {
            return Err(ApiError::Validation("Unknown category".to_string()));
        }
    }

    // A new title gets a new slug
    let new_slug = payload
        .title
        .as_ref()
        .filter(|t| t.trim() != product.title)
        .map(|t| slugify(t, now_millis()));

    let updated = state
        .products
        .update(id, &payload, new_slug.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": updated })))
}

/// Delete a product and its hosted images
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    owned_product(&state, &principal, id).await?;

    if let Some(hosted_ids) = state.products.delete(id).await? {
        state.image_store.delete_many(&hosted_ids).await;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted",
    })))
}

/// Replace or add the image at a position
pub async fn set_product_image(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, position)): Path<(Uuid, u32)>,
    Json(payload): Json<SetProductImageRequest>,
) -> ApiResult<impl IntoResponse> {
    let product = owned_product(&state, &principal, id).await?;

    let mut images = product.images;
    let mut replaced: Option<String> = None;

    match images.iter_mut().find(|i| i.position == position) {
        Some(slot) => {
            replaced = Some(slot.hosted_id.clone());
            slot.hosted_id = payload.image.hosted_id.clone();
            slot.url = payload.image.url.clone();
        }
        None => {
            let mut image = payload.image.clone();
            image.position = position;
            images.push(image);
            images.sort_by_key(|i| i.position);
        }
    }

    state.products.set_images(id, &images).await?;

    if let Some(old) = replaced {
        if old != payload.image.hosted_id {
            state.image_store.delete_many(&[old]).await;
        }
    }

    Ok(Json(json!({ "success": true, "data": images })))
}

/// Remove the image at a position
pub async fn remove_product_image(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, position)): Path<(Uuid, u32)>,
) -> ApiResult<impl IntoResponse> {
    let product = owned_product(&state, &principal, id).await?;

    let mut images = product.images;
    let Some(index) = images.iter().position(|i| i.position == position) else {
        return Err(ApiError::NotFound("No image at that position".to_string()));
    };

    let removed = images.remove(index);
    state.products.set_images(id, &images).await?;
    state.image_store.delete_many(&[removed.hosted_id]).await;

    Ok(Json(json!({ "success": true, "data": images })))
}

/// Moderation payload
#[derive(Debug, Deserialize)]
pub struct ProductApprovalRequest {
    pub approved: bool,
    pub rejection_reason: Option<String>,
}

/// Approve or reject a product (admin)
pub async fn set_product_approval(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductApprovalRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state
        .products
        .set_approval(id, payload.approved, payload.rejection_reason.as_deref())
        .await?;

    if !updated {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": if payload.approved { "Product approved" } else { "Product rejected" },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(is_approved: bool, is_active: bool) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            title: "Walnut desk".to_string(),
            slug: "walnut-desk-abc".to_string(),
            description: None,
            category_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            keywords: vec![],
            images: vec![],
            price: 120.0,
            is_approved,
            approval_date: is_approved.then_some(now),
            rejection_reason: None,
            views: 0,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_public_visibility_requires_approval_and_activity() {
        assert!(publicly_visible(&product(true, true)));
        assert!(!publicly_visible(&product(false, true)));
        assert!(!publicly_visible(&product(true, false)));
        assert!(!publicly_visible(&product(false, false)));
    }
}
