//! Pending vendor staging record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A signup awaiting admin approval
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingVendor {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub company_name: String,
    pub category_ids: Vec<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Signup request, submitted together with the OTP
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub otp: String,
    pub password: String,
    pub confirm_password: String,
    pub company_name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
    pub description: Option<String>,
}

/// Insert payload for the staging table
#[derive(Debug, Clone)]
pub struct NewPendingVendor {
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub company_name: String,
    pub category_ids: Vec<Uuid>,
    pub description: Option<String>,
}

/// Approval token row tied to a pending vendor
#[derive(Debug, Clone, FromRow)]
pub struct ApprovalToken {
    pub id: Uuid,
    pub token: String,
    pub pending_vendor_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
