//! Admin surface: pending approvals, vendor management, analytics
//!
//! The two link endpoints are unauthenticated HTML pages reached from the
//! approval email; everything else sits behind the admin guard.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::jwt::Claims;
use crate::models::admin::ApprovalLinkQuery;
use crate::models::pending_vendor::PendingVendor;
use crate::models::vendor::{
    LockRequest, SubscriptionUpdateRequest, UpdateVendorProfile, Vendor, VendorResponse,
};
use crate::models::Pagination;
use crate::models::Paginated;
use crate::repositories::vendor::VendorFilter;
use crate::state::AppState;
use crate::validation::validate_phone;

fn html_page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body style=\"font-family:sans-serif;max-width:600px;margin:80px auto\">\
         <h2>{title}</h2><p>{body}</p></body></html>"
    ))
}

/// Promote a pending vendor: insert the live account, drop the staging
/// row and its tokens, notify the vendor.
async fn promote(state: &AppState, pending: &PendingVendor, approved_by: &str) -> ApiResult<Vendor> {
    if state.vendors.exists_by_email(&pending.email).await? {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let vendor = state.vendors.create_from_pending(pending, approved_by).await?;

    state.pending_vendors.delete(pending.id).await?;
    state.approval_tokens.delete_for_pending(pending.id).await?;

    let login_url = format!("{}/login", state.config.base_url);
    if let Err(e) = state
        .email
        .send_approved(&vendor.email, &vendor.company_name, &login_url)
        .await
    {
        warn!("Failed to send approval email to {}: {}", vendor.email, e);
    }

    info!("Vendor approved: {}", vendor.email);
    Ok(vendor)
}

/// Deny a pending vendor: drop the staging row and its tokens, notify
/// the applicant.
async fn deny(state: &AppState, pending: &PendingVendor) -> ApiResult<()> {
    state.pending_vendors.delete(pending.id).await?;
    state.approval_tokens.delete_for_pending(pending.id).await?;

    if let Err(e) = state
        .email
        .send_denied(&pending.email, &pending.company_name)
        .await
    {
        warn!("Failed to send denial email to {}: {}", pending.email, e);
    }

    info!("Vendor registration denied: {}", pending.email);
    Ok(())
}

/// Why an emailed link could not be honored
enum LinkFailure {
    /// Token unknown, expired, or already consumed
    Stale,
    /// Token was fine but the staging row is gone
    Missing,
    /// The lookup itself failed
    Backend,
}

fn link_failure_response(failure: LinkFailure) -> (StatusCode, Html<String>) {
    match failure {
        LinkFailure::Stale => (
            StatusCode::BAD_REQUEST,
            html_page(
                "Invalid or expired token",
                "This approval link has already been used or has expired.",
            ),
        ),
        LinkFailure::Missing => (
            StatusCode::BAD_REQUEST,
            html_page(
                "Registration not found",
                "This registration has already been processed.",
            ),
        ),
        LinkFailure::Backend => (
            StatusCode::INTERNAL_SERVER_ERROR,
            html_page(
                "Something went wrong",
                "The request could not be processed. Please try the link again later.",
            ),
        ),
    }
}

async fn consume_link(
    state: &AppState,
    query: &ApprovalLinkQuery,
) -> Result<PendingVendor, (StatusCode, Html<String>)> {
    let consumed = match state
        .approval_tokens
        .consume(query.vendor_id, &query.token)
        .await
    {
        Ok(consumed) => consumed,
        Err(e) => {
            tracing::error!("Approval token lookup failed: {}", e);
            return Err(link_failure_response(LinkFailure::Backend));
        }
    };

    if consumed.is_none() {
        return Err(link_failure_response(LinkFailure::Stale));
    }

    match state.pending_vendors.find_by_id(query.vendor_id).await {
        Ok(Some(pending)) => Ok(pending),
        Ok(None) => Err(link_failure_response(LinkFailure::Missing)),
        Err(e) => {
            tracing::error!("Pending vendor lookup failed: {}", e);
            Err(link_failure_response(LinkFailure::Backend))
        }
    }
}

/// Approve a registration from the emailed link
pub async fn approve_via_link(
    State(state): State<AppState>,
    Query(query): Query<ApprovalLinkQuery>,
) -> impl IntoResponse {
    let pending = match consume_link(&state, &query).await {
        Ok(pending) => pending,
        Err((status, page)) => return (status, page).into_response(),
    };

    match promote(&state, &pending, "email-link").await {
        Ok(vendor) => html_page(
            "Vendor approved",
            &format!(
                "{} has been approved and notified by email.",
                vendor.company_name
            ),
        )
        .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            html_page("Approval failed", &e.to_string()),
        )
            .into_response(),
    }
}

/// Deny a registration from the emailed link
pub async fn deny_via_link(
    State(state): State<AppState>,
    Query(query): Query<ApprovalLinkQuery>,
) -> impl IntoResponse {
    let pending = match consume_link(&state, &query).await {
        Ok(pending) => pending,
        Err((status, page)) => return (status, page).into_response(),
    };

    match deny(&state, &pending).await {
        Ok(()) => html_page(
            "Registration denied",
            &format!("The registration from {} has been denied.", pending.email),
        )
        .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            html_page("Denial failed", &e.to_string()),
        )
            .into_response(),
    }
}

/// List registrations awaiting a decision
pub async fn list_pending_vendors(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let pending = state.pending_vendors.list().await?;
    Ok(Json(json!({ "success": true, "data": pending })))
}

/// Approve a pending vendor from the admin dashboard
pub async fn approve_pending(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    claims: axum::Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let pending = state
        .pending_vendors
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pending vendor not found".to_string()))?;

    let vendor = promote(&state, &pending, &claims.email).await?;

    Ok(Json(json!({
        "success": true,
        "data": VendorResponse::from_vendor(&vendor, Utc::now()),
    })))
}

/// Deny a pending vendor from the admin dashboard
pub async fn deny_pending(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let pending = state
        .pending_vendors
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pending vendor not found".to_string()))?;

    deny(&state, &pending).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration denied",
    })))
}

/// Vendor index query parameters
#[derive(Debug, Deserialize)]
pub struct VendorListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub search: Option<String>,
    pub is_approved: Option<bool>,
    pub is_locked: Option<bool>,
    pub is_active: Option<bool>,
}

/// List vendors with filters
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = VendorFilter {
        search: query.search.clone(),
        is_approved: query.is_approved,
        is_locked: query.is_locked,
        is_active: query.is_active,
    };

    let (vendors, total) = state.vendors.list(&filter, &query.pagination).await?;
    let now = Utc::now();
    let items: Vec<VendorResponse> = vendors
        .iter()
        .map(|v| VendorResponse::from_vendor(v, now))
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": Paginated::new(items, total, &query.pagination),
    })))
}

/// Fetch one vendor
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let vendor = state
        .vendors
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": VendorResponse::from_vendor(&vendor, Utc::now()),
    })))
}

/// Apply an allow-listed update to a vendor's profile
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVendorProfile>,
) -> ApiResult<impl IntoResponse> {
    if let Some(phone) = &payload.phone {
        validate_phone(phone).map_err(ApiError::Validation)?;
    }

    let vendor = state
        .vendors
        .update_profile(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": VendorResponse::from_vendor(&vendor, Utc::now()),
    })))
}

/// Toggle the approval flag on a live vendor
pub async fn set_vendor_approval(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    claims: axum::Extension<Claims>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<impl IntoResponse> {
    let approved = payload
        .get("approved")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| ApiError::Validation("'approved' boolean is required".to_string()))?;

    let updated = state.vendors.set_approval(id, approved, &claims.email).await?;
    if !updated {
        return Err(ApiError::NotFound("Vendor not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": if approved { "Vendor approved" } else { "Vendor approval revoked" },
    })))
}

/// Lock or unlock a vendor account.
///
/// An expiry lock can only be lifted by a new subscription unless
/// `force` is set.
pub async fn set_vendor_lock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LockRequest>,
) -> ApiResult<impl IntoResponse> {
    let vendor = state
        .vendors
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    if !payload.locked
        && vendor.lock_reason.as_deref() == Some("subscription_expired")
        && !payload.force
    {
        return Err(ApiError::Conflict(
            "Lock came from subscription expiry. Assign a subscription or pass force.".to_string(),
        ));
    }

    state
        .vendors
        .set_lock(id, payload.locked, payload.reason.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": if payload.locked { "Vendor locked" } else { "Vendor unlocked" },
    })))
}

/// Assign a fresh subscription term
pub async fn update_vendor_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubscriptionUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    if crate::subscription::plan_for_duration(payload.duration_months).is_none() {
        return Err(ApiError::Validation(
            "Duration must be 1, 3, 6, or 12 months".to_string(),
        ));
    }

    let vendor = state
        .vendors
        .update_subscription(id, payload.duration_months)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": VendorResponse::from_vendor(&vendor, Utc::now()),
    })))
}

/// Hard-delete a vendor, cascading products, orders, and hosted images
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let vendor = state
        .vendors
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    let hosted_ids = state.products.delete_for_vendor(id).await?;
    state.customers.delete_for_vendor(id).await?;
    state.vendors.delete(id).await?;

    state.image_store.delete_many(&hosted_ids).await;
    if let Some(avatar) = &vendor.avatar {
        if let Err(e) = state.image_store.delete(&avatar.hosted_id).await {
            warn!("Failed to delete avatar {}: {}", avatar.hosted_id, e);
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Vendor deleted",
    })))
}

/// Aggregate vendor counts
pub async fn vendor_overview(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let overview = state.vendors.overview().await?;
    Ok(Json(json!({ "success": true, "data": overview })))
}

/// Trailing-window query for time series endpoints
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

/// Daily vendor registrations
pub async fn vendor_registrations(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<impl IntoResponse> {
    let points = state.vendors.registrations(query.days).await?;
    Ok(Json(json!({ "success": true, "data": points })))
}

/// Vendors per subscription plan
pub async fn plan_breakdown(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let breakdown = state.vendors.plan_breakdown().await?;
    Ok(Json(json!({ "success": true, "data": breakdown })))
}

/// Most used categories across vendor profiles
pub async fn top_categories(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let usage = state.vendors.top_categories(10).await?;
    Ok(Json(json!({ "success": true, "data": usage })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_failure_is_not_reported_as_stale_link() {
        let (status, Html(body)) = link_failure_response(LinkFailure::Backend);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Something went wrong"));

        let (status, Html(body)) = link_failure_response(LinkFailure::Stale);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid or expired token"));

        let (status, _) = link_failure_response(LinkFailure::Missing);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
