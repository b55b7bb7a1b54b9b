//! OTP-gated vendor signup
//!
//! `no-record → otp-sent → pending-approval`: send-otp mails a 6-digit
//! code, signup verifies it and stages a pending vendor, then asks the
//! platform admin for a decision via emailed one-time links.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::models::otp::SendOtpRequest;
use crate::models::pending_vendor::{NewPendingVendor, SignupRequest};
use crate::otp::{OTP_COOLDOWN_SECONDS, generate_approval_token, generate_otp};
use crate::repositories::hash_password;
use crate::state::AppState;
use crate::validation::{
    validate_company_name, validate_email, validate_otp_format, validate_password, validate_phone,
};

/// Send a verification code to a prospective vendor
pub async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = payload.email.trim().to_lowercase();
    validate_email(&email).map_err(ApiError::Validation)?;

    if state.otps.find_live(&email).await?.is_some() {
        return Err(ApiError::RateLimited(
            "A verification code was already sent. Please wait before requesting another."
                .to_string(),
        ));
    }

    if state.pending_vendors.exists_by_email(&email).await? {
        return Err(ApiError::Conflict(
            "A registration for this email is already awaiting approval".to_string(),
        ));
    }

    if state.vendors.exists_by_email(&email).await? {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let code = generate_otp();
    state.otps.create(&email, &code).await?;

    if let Err(e) = state.email.send_otp(&email, &code).await {
        warn!("Failed to send OTP email to {}: {}", email, e);
    }

    info!("OTP issued for {}", email);

    Ok(Json(json!({
        "success": true,
        "message": "Verification code sent",
    })))
}

/// Complete signup: verify the code, stage the vendor, notify the admin
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = payload.email.trim().to_lowercase();
    validate_email(&email).map_err(ApiError::Validation)?;
    validate_otp_format(&payload.otp).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;
    validate_company_name(&payload.company_name).map_err(ApiError::Validation)?;
    if let Some(phone) = &payload.phone {
        validate_phone(phone).map_err(ApiError::Validation)?;
    }

    if payload.password != payload.confirm_password {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }

    let otp = state
        .otps
        .find_live(&email)
        .await?
        .ok_or_else(|| ApiError::Validation("Invalid or expired verification code".to_string()))?;

    let now = chrono::Utc::now();
    if otp.in_cooldown(now, OTP_COOLDOWN_SECONDS) {
        return Err(ApiError::RateLimited(
            "Too many failed attempts. Please request a new code later.".to_string(),
        ));
    }

    if otp.is_expired(now) {
        return Err(ApiError::Validation(
            "Invalid or expired verification code".to_string(),
        ));
    }

    if otp.code != payload.otp.trim() {
        let attempts = state.otps.record_failed_attempt(otp.id).await?;
        let message = if attempts >= otp.max_attempts {
            "Too many failed attempts. Please request a new code later."
        } else {
            "Invalid verification code"
        };
        return Err(ApiError::Validation(message.to_string()));
    }

    // Re-check both tables: the OTP may have outlived an earlier signup
    if state.pending_vendors.exists_by_email(&email).await? {
        return Err(ApiError::Conflict(
            "A registration for this email is already awaiting approval".to_string(),
        ));
    }
    if state.vendors.exists_by_email(&email).await? {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    state.otps.delete(otp.id).await?;

    let password_hash = hash_password(&payload.password)?;
    let pending = state
        .pending_vendors
        .create(&NewPendingVendor {
            email: email.clone(),
            password_hash,
            phone: payload.phone.clone(),
            company_name: payload.company_name.trim().to_string(),
            category_ids: payload.category_ids.clone(),
            description: payload.description.clone(),
        })
        .await?;

    let token = generate_approval_token();
    state.approval_tokens.create(pending.id, &token).await?;

    let approve_url = format!(
        "{}/api/admin/approve?vendor_id={}&token={}",
        state.config.base_url, pending.id, token
    );
    let deny_url = format!(
        "{}/api/admin/deny?vendor_id={}&token={}",
        state.config.base_url, pending.id, token
    );

    if let Err(e) = state
        .email
        .send_approval_request(
            &state.config.admin_email,
            &pending.company_name,
            &pending.email,
            &approve_url,
            &deny_url,
        )
        .await
    {
        warn!("Failed to send approval request email: {}", e);
    }

    info!("Signup staged for approval: {}", pending.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration submitted. You will be notified once it is reviewed.",
        })),
    ))
}
