//! Super-admin repository

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::admin::SuperAdmin;

/// Super-admin repository
#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    /// Create a new super-admin repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an admin by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SuperAdmin>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, created_at, updated_at \
             FROM super_admins WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_admin(&r)))
    }

    /// Find an admin by email, case-insensitively
    pub async fn find_by_email(&self, email: &str) -> Result<Option<SuperAdmin>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, created_at, updated_at \
             FROM super_admins WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_admin(&r)))
    }
}

fn map_admin(row: &PgRow) -> SuperAdmin {
    SuperAdmin {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
