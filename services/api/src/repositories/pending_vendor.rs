//! Pending vendor repository

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::pending_vendor::{NewPendingVendor, PendingVendor};

/// Pending vendor repository
#[derive(Clone)]
pub struct PendingVendorRepository {
    pool: PgPool,
}

impl PendingVendorRepository {
    /// Create a new pending vendor repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stage a verified signup for approval
    pub async fn create(&self, new: &NewPendingVendor) -> Result<PendingVendor> {
        info!("Staging pending vendor: {}", new.email);

        let row = sqlx::query(
            r#"
            INSERT INTO pending_vendors
                (email, password_hash, phone, company_name, category_ids, description)
            VALUES (LOWER($1), $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, phone, company_name, category_ids,
                      description, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.phone)
        .bind(&new.company_name)
        .bind(&new.category_ids)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_pending(&row))
    }

    /// Find a pending vendor by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PendingVendor>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, phone, company_name, category_ids,
                   description, created_at
            FROM pending_vendors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_pending(&r)))
    }

    /// Whether a signup is already staged for this email
    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 AS one FROM pending_vendors WHERE LOWER(email) = LOWER($1) LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// List all staged signups, oldest first
    pub async fn list(&self) -> Result<Vec<PendingVendor>> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, password_hash, phone, company_name, category_ids,
                   description, created_at
            FROM pending_vendors
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_pending).collect())
    }

    /// Remove a consumed staging row
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pending_vendors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_pending(row: &PgRow) -> PendingVendor {
    PendingVendor {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        phone: row.get("phone"),
        company_name: row.get("company_name"),
        category_ids: row.get("category_ids"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}
