//! Banner repository
//!
//! Expiry is lazy: a sweep UPDATE flips stale banners invisible before
//! every read, replacing a scheduled job.

use anyhow::Result;
use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::images::HostedImage;
use crate::models::banner::{Banner, CreateBannerRequest, UpdateBannerRequest};

/// Aggregate banner counts
#[derive(Debug, Serialize)]
pub struct BannerStats {
    pub total: i64,
    pub visible: i64,
    pub expired: i64,
}

/// Banner repository
#[derive(Clone)]
pub struct BannerRepository {
    pool: PgPool,
}

impl BannerRepository {
    /// Create a new banner repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a banner; expiry is computed from the visibility term
    pub async fn create(&self, payload: &CreateBannerRequest, created_by: Option<Uuid>) -> Result<Banner> {
        info!("Creating banner '{}' for vendor {}", payload.title, payload.vendor_id);

        let expiry_date = Utc::now() + Duration::days(payload.visibility_days as i64);

        let row = sqlx::query(
            r#"
            INSERT INTO banners
                (title, vendor_id, image_hosted_id, image_url, visibility_days,
                 expiry_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(payload.title.trim())
        .bind(payload.vendor_id)
        .bind(&payload.image.hosted_id)
        .bind(&payload.image.url)
        .bind(payload.visibility_days)
        .bind(expiry_date)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_banner(&row))
    }

    /// Flip expired banners invisible; runs before reads
    pub async fn sweep_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE banners SET is_visible = FALSE, updated_at = NOW() \
             WHERE is_visible AND expiry_date <= NOW()",
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find a banner by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Banner>> {
        let row = sqlx::query("SELECT * FROM banners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_banner(&r)))
    }

    /// List banners, newest first; `visible_only` for the public surface
    pub async fn list(&self, visible_only: bool) -> Result<Vec<Banner>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM banners
            WHERE NOT $1 OR is_visible
            ORDER BY created_at DESC
            "#,
        )
        .bind(visible_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_banner).collect())
    }

    /// Apply an allow-listed update.
    ///
    /// A new visibility term restarts the expiry clock from now.
    pub async fn update(&self, id: Uuid, update: &UpdateBannerRequest) -> Result<Option<Banner>> {
        let new_expiry = update
            .visibility_days
            .map(|days| Utc::now() + Duration::days(days as i64));

        let row = sqlx::query(
            r#"
            UPDATE banners SET
                title = COALESCE($2, title),
                image_hosted_id = COALESCE($3, image_hosted_id),
                image_url = COALESCE($4, image_url),
                visibility_days = COALESCE($5, visibility_days),
                expiry_date = COALESCE($6, expiry_date),
                is_visible = COALESCE($7, is_visible),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_ref().map(|t| t.trim().to_string()))
        .bind(update.image.as_ref().map(|i| i.hosted_id.clone()))
        .bind(update.image.as_ref().map(|i| i.url.clone()))
        .bind(update.visibility_days)
        .bind(new_expiry)
        .bind(update.is_visible)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| map_banner(&r)))
    }

    /// Delete a banner, returning its hosted image id for cleanup
    pub async fn delete(&self, id: Uuid) -> Result<Option<String>> {
        let row = sqlx::query("DELETE FROM banners WHERE id = $1 RETURNING image_hosted_id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("image_hosted_id")))
    }

    /// Aggregate counts for the admin dashboard
    pub async fn stats(&self) -> Result<BannerStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_visible) AS visible,
                COUNT(*) FILTER (WHERE expiry_date <= NOW()) AS expired
            FROM banners
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(BannerStats {
            total: row.get("total"),
            visible: row.get("visible"),
            expired: row.get("expired"),
        })
    }
}

fn map_banner(row: &PgRow) -> Banner {
    Banner {
        id: row.get("id"),
        title: row.get("title"),
        vendor_id: row.get("vendor_id"),
        image: HostedImage {
            hosted_id: row.get("image_hosted_id"),
            url: row.get("image_url"),
        },
        visibility_days: row.get("visibility_days"),
        expiry_date: row.get("expiry_date"),
        is_visible: row.get("is_visible"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
