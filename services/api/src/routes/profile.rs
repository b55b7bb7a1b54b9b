//! Vendor self-service profile endpoints

use axum::{Extension, Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::images::HostedImage;
use crate::jwt::Claims;
use crate::middleware::{Principal, TOKEN_COOKIE};
use crate::models::vendor::{
    ChangeEmailRequest, ChangePasswordRequest, DeactivateRequest, UpdateVendorProfile, Vendor,
    VendorResponse,
};
use crate::repositories::{hash_password, verify_password};
use crate::state::AppState;
use crate::validation::{validate_email, validate_password, validate_phone};

fn current_vendor(principal: &Principal) -> Result<&Vendor, ApiError> {
    match principal {
        Principal::Vendor(vendor) => Ok(vendor),
        Principal::Admin(_) => Err(ApiError::Forbidden("Vendor access required".to_string())),
    }
}

/// Fetch the caller's own profile
pub async fn get_profile(
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;
    Ok(Json(json!({
        "success": true,
        "data": VendorResponse::from_vendor(vendor, Utc::now()),
    })))
}

/// Apply an allow-listed update to the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UpdateVendorProfile>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;

    if let Some(phone) = &payload.phone {
        validate_phone(phone).map_err(ApiError::Validation)?;
    }
    if let Some(name) = &payload.company_name {
        crate::validation::validate_company_name(name).map_err(ApiError::Validation)?;
    }

    let updated = state
        .vendors
        .update_profile(vendor.id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": VendorResponse::from_vendor(&updated, Utc::now()),
    })))
}

/// Change the account password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;

    if !verify_password(&vendor.password_hash, &payload.current_password)? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    validate_password(&payload.new_password).map_err(ApiError::Validation)?;
    if payload.new_password != payload.confirm_password {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }

    let hash = hash_password(&payload.new_password)?;
    state.vendors.update_password(vendor.id, &hash).await?;

    info!("Password changed for vendor {}", vendor.id);

    Ok(Json(json!({
        "success": true,
        "message": "Password updated",
    })))
}

/// Change the account email
pub async fn change_email(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ChangeEmailRequest>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;

    if !verify_password(&vendor.password_hash, &payload.password)? {
        return Err(ApiError::Unauthorized("Password is incorrect".to_string()));
    }

    let new_email = payload.new_email.trim().to_lowercase();
    validate_email(&new_email).map_err(ApiError::Validation)?;

    if state.vendors.exists_by_email(&new_email).await? {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    state.vendors.update_email(vendor.id, &new_email).await?;

    info!("Email changed for vendor {}", vendor.id);

    Ok(Json(json!({
        "success": true,
        "message": "Email updated. Use the new address on your next login.",
    })))
}

/// Set the avatar to an already uploaded image, dropping the old one
pub async fn set_avatar(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(image): Json<HostedImage>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;

    state.vendors.update_avatar(vendor.id, Some(&image)).await?;

    if let Some(old) = &vendor.avatar {
        if old.hosted_id != image.hosted_id {
            if let Err(e) = state.image_store.delete(&old.hosted_id).await {
                warn!("Failed to delete old avatar {}: {}", old.hosted_id, e);
            }
        }
    }

    Ok(Json(json!({ "success": true, "data": image })))
}

/// Remove the avatar
pub async fn delete_avatar(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;

    state.vendors.update_avatar(vendor.id, None).await?;

    if let Some(old) = &vendor.avatar {
        if let Err(e) = state.image_store.delete(&old.hosted_id).await {
            warn!("Failed to delete avatar {}: {}", old.hosted_id, e);
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Avatar removed",
    })))
}

/// Dashboard stats for the caller
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;
    let now = Utc::now();

    let product_count = state.products.count_for_vendor(vendor.id).await?;
    let orders = state.customers.overview(Some(vendor.id)).await?;
    let top_products = state.customers.top_products(Some(vendor.id), 5).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "products": {
                "count": product_count,
                "limit": vendor.max_product_limit,
            },
            "orders": orders,
            "top_products": top_products,
            "subscription": {
                "status": vendor.subscription_status(now),
                "days_remaining": vendor.subscription_days_remaining(now),
                "plan": vendor.current_plan,
                "end_date": vendor.subscription_end,
            },
        },
    })))
}

/// Soft-deactivate the account
pub async fn deactivate_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<DeactivateRequest>,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?;

    state
        .vendors
        .deactivate(vendor.id, payload.reason.as_deref())
        .await?;

    info!("Vendor deactivated own account: {}", vendor.id);

    Ok(Json(json!({
        "success": true,
        "message": "Account deactivated. Log in again at any time to reactivate.",
    })))
}

/// Reactivate a deactivated account.
///
/// Reached through the credential-only guard so deactivated vendors can
/// still call it.
pub async fn reactivate_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let vendor = state
        .vendors
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Vendor account no longer exists".to_string()))?;

    if vendor.is_active {
        return Err(ApiError::Conflict("Account is already active".to_string()));
    }

    state.vendors.reactivate(vendor.id).await?;

    info!("Vendor reactivated account: {}", vendor.id);

    Ok(Json(json!({
        "success": true,
        "message": "Account reactivated",
    })))
}

/// Hard-delete the account, cascading products, orders, and images
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    let vendor = current_vendor(&principal)?.clone();

    let hosted_ids = state.products.delete_for_vendor(vendor.id).await?;
    state.customers.delete_for_vendor(vendor.id).await?;
    state.vendors.delete(vendor.id).await?;

    state.image_store.delete_many(&hosted_ids).await;
    if let Some(avatar) = &vendor.avatar {
        if let Err(e) = state.image_store.delete(&avatar.hosted_id).await {
            warn!("Failed to delete avatar {}: {}", avatar.hosted_id, e);
        }
    }

    info!("Vendor deleted own account: {}", vendor.id);

    let jar = jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/"));
    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Account deleted",
        })),
    ))
}
