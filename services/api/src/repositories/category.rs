//! Category repository

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::images::HostedImage;
use crate::models::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};

/// Category repository
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a category
    pub async fn create(&self, payload: &CreateCategoryRequest) -> Result<Category> {
        info!("Creating category: {}", payload.name);

        let row = sqlx::query(
            r#"
            INSERT INTO categories (name, description, image_hosted_id, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, image_hosted_id, image_url,
                      created_at, updated_at
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.description)
        .bind(payload.image.as_ref().map(|i| i.hosted_id.clone()))
        .bind(payload.image.as_ref().map(|i| i.url.clone()))
        .fetch_one(&self.pool)
        .await?;

        Ok(map_category(&row))
    }

    /// Find a category by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, image_hosted_id, image_url,
                   created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_category(&r)))
    }

    /// Whether a category with this name exists, ignoring case.
    ///
    /// `exclude` skips one row so updates can keep their own name.
    pub async fn name_taken(&self, name: &str, exclude: Option<Uuid>) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS one FROM categories
            WHERE LOWER(name) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(name.trim())
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// List all categories alphabetically
    pub async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, image_hosted_id, image_url,
                   created_at, updated_at
            FROM categories
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_category).collect())
    }

    /// Apply an allow-listed update
    pub async fn update(&self, id: Uuid, update: &UpdateCategoryRequest) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_hosted_id = COALESCE($4, image_hosted_id),
                image_url = COALESCE($5, image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, image_hosted_id, image_url,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.name.as_ref().map(|n| n.trim().to_string()))
        .bind(&update.description)
        .bind(update.image.as_ref().map(|i| i.hosted_id.clone()))
        .bind(update.image.as_ref().map(|i| i.url.clone()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_category(&r)))
    }

    /// Delete a category
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_category(row: &PgRow) -> Category {
    let image = match (
        row.get::<Option<String>, _>("image_hosted_id"),
        row.get::<Option<String>, _>("image_url"),
    ) {
        (Some(hosted_id), Some(url)) => Some(HostedImage { hosted_id, url }),
        _ => None,
    };

    Category {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
