//! Approval token repository
//!
//! Tokens are single use: consumption deletes the row, so a second click
//! on an emailed link finds nothing.

use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::pending_vendor::ApprovalToken;
use crate::otp::APPROVAL_TOKEN_TTL_DAYS;

/// Approval token repository
#[derive(Clone)]
pub struct ApprovalTokenRepository {
    pool: PgPool,
}

impl ApprovalTokenRepository {
    /// Create a new approval token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mint a token for a pending vendor
    pub async fn create(&self, pending_vendor_id: Uuid, token: &str) -> Result<ApprovalToken> {
        let expires_at = Utc::now() + Duration::days(APPROVAL_TOKEN_TTL_DAYS);

        let row = sqlx::query(
            r#"
            INSERT INTO approval_tokens (token, pending_vendor_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, token, pending_vendor_id, expires_at, created_at
            "#,
        )
        .bind(token)
        .bind(pending_vendor_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_token(&row))
    }

    /// Atomically consume an unexpired token for the given pending vendor.
    ///
    /// Returns `None` when the token is unknown, stale, consumed, or tied
    /// to a different pending vendor.
    pub async fn consume(&self, pending_vendor_id: Uuid, token: &str) -> Result<Option<ApprovalToken>> {
        let row = sqlx::query(
            r#"
            DELETE FROM approval_tokens
            WHERE token = $1 AND pending_vendor_id = $2 AND expires_at > NOW()
            RETURNING id, token, pending_vendor_id, expires_at, created_at
            "#,
        )
        .bind(token)
        .bind(pending_vendor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| map_token(&r)))
    }

    /// Drop every token minted for a pending vendor
    pub async fn delete_for_pending(&self, pending_vendor_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM approval_tokens WHERE pending_vendor_id = $1")
            .bind(pending_vendor_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn map_token(row: &PgRow) -> ApprovalToken {
    ApprovalToken {
        id: row.get("id"),
        token: row.get("token"),
        pending_vendor_id: row.get("pending_vendor_id"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}
