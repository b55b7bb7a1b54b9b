//! Authentication and rate limiting middleware
//!
//! The base step decodes the signed credential from the `token` cookie or
//! a `Bearer` header into claims. Role guards then re-fetch the live
//! record and re-validate it; an expired subscription is the one place a
//! guard writes state (the auto-lock). Credential failures clear the
//! session cookie on the way out.

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use chrono::Utc;
use std::net::SocketAddr;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::jwt::{Claims, Role};
use crate::models::admin::SuperAdmin;
use crate::models::vendor::{Vendor, VendorStatus};
use crate::state::AppState;
use crate::subscription::SubscriptionStatus;

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

/// The authenticated caller, resolved to its live record
#[derive(Clone)]
pub enum Principal {
    Vendor(Box<Vendor>),
    Admin(SuperAdmin),
}

impl Principal {
    /// Ownership check: vendors only see their own rows, admins bypass
    pub fn may_access_vendor(&self, vendor_id: Uuid) -> Result<(), ApiError> {
        match self {
            Principal::Admin(_) => Ok(()),
            Principal::Vendor(v) if v.id == vendor_id => Ok(()),
            Principal::Vendor(_) => Err(ApiError::Forbidden(
                "You do not have access to this resource".to_string(),
            )),
        }
    }
}

/// Pull the raw token from the cookie or the Authorization header
fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Decode the credential into claims
fn authenticate(
    state: &AppState,
    jar: &CookieJar,
    headers: &HeaderMap,
) -> Result<Claims, ApiError> {
    let token = extract_token(jar, headers)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    state
        .jwt
        .validate_token(&token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

/// Render an auth error, clearing the session cookie for credential failures
fn auth_error_response(jar: CookieJar, error: ApiError) -> Response {
    if matches!(error, ApiError::Unauthorized(_)) {
        let jar = jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/"));
        (jar, error).into_response()
    } else {
        error.into_response()
    }
}

/// Re-validate a vendor's live record.
///
/// Computing `Expired` here persists the lock before rejecting; that is
/// the only side effect a guard performs.
async fn vendor_guard(state: &AppState, id: Uuid) -> Result<Vendor, ApiError> {
    let vendor = state
        .vendors
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Vendor account no longer exists".to_string()))?;

    match vendor.status(Utc::now()) {
        VendorStatus::Deactivated { .. } => {
            Err(ApiError::Forbidden("Account is deactivated".to_string()))
        }
        VendorStatus::PendingApproval => {
            Err(ApiError::Forbidden("Account is not approved".to_string()))
        }
        VendorStatus::Locked { reason } => {
            let message = if reason.as_deref() == Some("subscription_expired") {
                "Subscription expired"
            } else {
                "Account is locked"
            };
            Err(ApiError::Forbidden(message.to_string()))
        }
        VendorStatus::Active {
            subscription: SubscriptionStatus::Expired,
        } => {
            state.vendors.lock_for_subscription_expiry(vendor.id).await?;
            Err(ApiError::Forbidden("Subscription expired".to_string()))
        }
        VendorStatus::Active { .. } => Ok(vendor),
    }
}

async fn admin_guard(state: &AppState, id: Uuid) -> Result<SuperAdmin, ApiError> {
    state
        .admins
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Admin account no longer exists".to_string()))
}

/// Require any valid credential; inserts `Claims` into extensions
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &jar, req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => auth_error_response(jar, e),
    }
}

/// Require an approved, unlocked vendor with a live subscription.
///
/// Inserts `Claims` and the `Principal` into extensions.
pub async fn require_vendor(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = match authenticate(&state, &jar, req.headers()) {
        Ok(claims) => claims,
        Err(e) => return auth_error_response(jar, e),
    };

    if claims.role != Role::Vendor {
        return ApiError::Forbidden("Vendor access required".to_string()).into_response();
    }

    match vendor_guard(&state, claims.sub).await {
        Ok(vendor) => {
            req.extensions_mut().insert(claims);
            req.extensions_mut()
                .insert(Principal::Vendor(Box::new(vendor)));
            next.run(req).await
        }
        Err(e) => auth_error_response(jar, e),
    }
}

/// Require a vendor credential without the approval and lock checks.
///
/// Used by the account reactivation endpoint, which deactivated vendors
/// must still be able to reach.
pub async fn require_vendor_credential(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = match authenticate(&state, &jar, req.headers()) {
        Ok(claims) => claims,
        Err(e) => return auth_error_response(jar, e),
    };

    if claims.role != Role::Vendor {
        return ApiError::Forbidden("Vendor access required".to_string()).into_response();
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}

/// Require a super-admin; inserts `Claims` and the `Principal`
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = match authenticate(&state, &jar, req.headers()) {
        Ok(claims) => claims,
        Err(e) => return auth_error_response(jar, e),
    };

    if claims.role != Role::SuperAdmin {
        return ApiError::Forbidden("Admin access required".to_string()).into_response();
    }

    match admin_guard(&state, claims.sub).await {
        Ok(admin) => {
            req.extensions_mut().insert(claims);
            req.extensions_mut().insert(Principal::Admin(admin));
            next.run(req).await
        }
        Err(e) => auth_error_response(jar, e),
    }
}

/// Accept either a vendor or an admin, applying the matching guard
pub async fn require_vendor_or_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = match authenticate(&state, &jar, req.headers()) {
        Ok(claims) => claims,
        Err(e) => return auth_error_response(jar, e),
    };

    let principal = match claims.role {
        Role::Vendor => match vendor_guard(&state, claims.sub).await {
            Ok(vendor) => Principal::Vendor(Box::new(vendor)),
            Err(e) => return auth_error_response(jar, e),
        },
        Role::SuperAdmin => match admin_guard(&state, claims.sub).await {
            Ok(admin) => Principal::Admin(admin),
            Err(e) => return auth_error_response(jar, e),
        },
    };

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(principal);
    next.run(req).await
}

/// Throttle public endpoints by caller IP
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let key = addr.ip().to_string();

    match state.rate_limiter.is_allowed(&key).await {
        Ok(true) => next.run(req).await,
        Ok(false) => {
            warn!("Rate limited request from {}", key);
            ApiError::RateLimited("Too many requests. Please try again later.".to_string())
                .into_response()
        }
        Err(e) => {
            warn!("Rate limiter failure: {}", e);
            // Fail open rather than dropping traffic
            next.run(req).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vendor_with_id(id: Uuid) -> Vendor {
        Vendor {
            id,
            email: "vendor@example.com".to_string(),
            password_hash: String::new(),
            phone: None,
            company_name: "Oak & Pine".to_string(),
            street: None,
            city: None,
            state: None,
            country: None,
            postal_code: None,
            description: None,
            avatar: None,
            category_ids: vec![],
            is_active: true,
            is_approved: true,
            is_locked: false,
            approved_by: None,
            approved_at: None,
            deactivated_at: None,
            deactivation_reason: None,
            locked_at: None,
            lock_reason: None,
            login_attempts: 0,
            lock_until: None,
            last_login: None,
            max_product_limit: 10,
            subscription_duration: Some(1),
            subscription_start: Some(Utc::now()),
            subscription_end: None,
            last_purchase_date: None,
            total_purchases: 1,
            current_plan: Some("basic_1m".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_ownership_check() {
        let id = Uuid::new_v4();
        let principal = Principal::Vendor(Box::new(vendor_with_id(id)));

        assert!(principal.may_access_vendor(id).is_ok());
        assert!(principal.may_access_vendor(Uuid::new_v4()).is_err());
    }
}
