//! Login, logout, and session handling

use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::jwt::Role;
use crate::middleware::TOKEN_COOKIE;
use crate::models::vendor::{LoginRequest, VendorResponse};
use crate::repositories::verify_password;
use crate::state::AppState;
use crate::validation::validate_email;

fn session_cookie(token: &str, max_age_seconds: u64) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_seconds as i64))
        .build()
}

/// Vendor login with failed-attempt throttling
pub async fn vendor_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;

    let vendor = state
        .vendors
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if let Some(lock_until) = vendor.lock_until {
        if lock_until > Utc::now() {
            return Err(ApiError::Forbidden(
                "Too many failed login attempts. Try again later.".to_string(),
            ));
        }
    }

    if !verify_password(&vendor.password_hash, &payload.password)? {
        state.vendors.record_login_failure(vendor.id).await?;
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    state.vendors.record_login_success(vendor.id).await?;
    info!("Vendor logged in: {}", vendor.email);

    let token = state
        .jwt
        .generate_token(vendor.id, Role::Vendor, &vendor.email)?;
    let jar = jar.add(session_cookie(&token, state.jwt.token_expiry()));

    Ok((
        jar,
        Json(json!({
            "success": true,
            "token": token,
            "data": VendorResponse::from_vendor(&vendor, Utc::now()),
        })),
    ))
}

/// Super-admin login
pub async fn admin_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;

    let admin = state
        .admins
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&admin.password_hash, &payload.password)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    info!("Admin logged in: {}", admin.email);

    let token = state
        .jwt
        .generate_token(admin.id, Role::SuperAdmin, &admin.email)?;
    let jar = jar.add(session_cookie(&token, state.jwt.token_expiry()));

    Ok((
        jar,
        Json(json!({
            "success": true,
            "token": token,
            "data": { "id": admin.id, "email": admin.email, "name": admin.name },
        })),
    ))
}

/// Clear the session cookie
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/"));
    (
        jar,
        Json(json!({
            "success": true,
            "message": "Logged out",
        })),
    )
}
