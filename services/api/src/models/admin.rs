//! Super-admin model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Platform operator account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SuperAdmin {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters on the emailed approve/deny links
#[derive(Debug, Deserialize)]
pub struct ApprovalLinkQuery {
    pub vendor_id: Uuid,
    pub token: String,
}
