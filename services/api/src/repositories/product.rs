//! Product repository

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::Pagination;
use crate::models::product::{
    CreateProductRequest, Product, ProductImage, ProductQuery, UpdateProductRequest,
};

/// Product repository
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a product for a vendor
    pub async fn create(
        &self,
        vendor_id: Uuid,
        slug: &str,
        payload: &CreateProductRequest,
    ) -> Result<Product> {
        info!("Creating product '{}' for vendor {}", payload.title, vendor_id);

        let images = serde_json::to_value(&payload.images)?;

        let row = sqlx::query(
            r#"
            INSERT INTO products
                (title, slug, description, category_id, vendor_id, keywords, images, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(payload.title.trim())
        .bind(slug)
        .bind(&payload.description)
        .bind(payload.category_id)
        .bind(vendor_id)
        .bind(&payload.keywords)
        .bind(images)
        .bind(payload.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_product(&row))
    }

    /// Find a product by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_product(&r)))
    }

    /// Find a product by slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_product(&r)))
    }

    /// Bump the view counter
    pub async fn increment_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE products SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// How many products a vendor currently holds
    pub async fn count_for_vendor(&self, vendor_id: Uuid) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM products WHERE vendor_id = $1")
            .bind(vendor_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    /// List products with filters, search, and pagination.
    ///
    /// `visible_only` restricts to approved, active rows for public
    /// listings; vendor and admin views pass `false`.
    pub async fn list(
        &self,
        query: &ProductQuery,
        pagination: &Pagination,
        visible_only: bool,
    ) -> Result<(Vec<Product>, i64)> {
        let (limit, offset) = pagination.clamped();
        let search = query.search.as_ref().map(|s| format!("%{}%", s.trim()));
        let order = sort_clause(query.sort.as_deref());

        let sql = format!(
            r#"
            SELECT * FROM products
            WHERE ($1::text IS NULL OR title ILIKE $1
                   OR EXISTS (SELECT 1 FROM UNNEST(keywords) kw WHERE kw ILIKE $1))
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::uuid IS NULL OR vendor_id = $3)
              AND (NOT $4 OR (is_approved AND is_active))
            ORDER BY {}
            LIMIT $5 OFFSET $6
            "#,
            order
        );

        let rows = sqlx::query(&sql)
            .bind(&search)
            .bind(query.category_id)
            .bind(query.vendor_id)
            .bind(visible_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM products
            WHERE ($1::text IS NULL OR title ILIKE $1
                   OR EXISTS (SELECT 1 FROM UNNEST(keywords) kw WHERE kw ILIKE $1))
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::uuid IS NULL OR vendor_id = $3)
              AND (NOT $4 OR (is_approved AND is_active))
            "#,
        )
        .bind(&search)
        .bind(query.category_id)
        .bind(query.vendor_id)
        .bind(visible_only)
        .fetch_one(&self.pool)
        .await?
        .get("count");

        Ok((rows.iter().map(map_product).collect(), total))
    }

    /// Apply an allow-listed update.
    ///
    /// `new_slug` replaces the slug when the title changed; editing the
    /// title or description sends the product back to moderation.
    pub async fn update(
        &self,
        id: Uuid,
        update: &UpdateProductRequest,
        new_slug: Option<&str>,
    ) -> Result<Option<Product>> {
        let reset_approval = update.title.is_some() || update.description.is_some();

        let row = sqlx::query(
            r#"
            UPDATE products SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id),
                keywords = COALESCE($6, keywords),
                price = COALESCE($7, price),
                is_active = COALESCE($8, is_active),
                is_approved = CASE WHEN $9 THEN FALSE ELSE is_approved END,
                approval_date = CASE WHEN $9 THEN NULL ELSE approval_date END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_ref().map(|t| t.trim().to_string()))
        .bind(new_slug)
        .bind(&update.description)
        .bind(update.category_id)
        .bind(&update.keywords)
        .bind(update.price)
        .bind(update.is_active)
        .bind(reset_approval)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| map_product(&r)))
    }

    /// Replace the whole image array
    pub async fn set_images(&self, id: Uuid, images: &[ProductImage]) -> Result<bool> {
        let value = serde_json::to_value(images)?;
        let result = sqlx::query("UPDATE products SET images = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Approve or reject a product
    pub async fn set_approval(&self, id: Uuid, approved: bool, reason: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                is_approved = $2,
                approval_date = CASE WHEN $2 THEN NOW() ELSE NULL END,
                rejection_reason = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(approved)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a product, returning its hosted image ids for cleanup
    pub async fn delete(&self, id: Uuid) -> Result<Option<Vec<String>>> {
        let row = sqlx::query("DELETE FROM products WHERE id = $1 RETURNING images")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| hosted_ids(&r)))
    }

    /// Delete every product a vendor owns, returning hosted image ids
    pub async fn delete_for_vendor(&self, vendor_id: Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query("DELETE FROM products WHERE vendor_id = $1 RETURNING images")
            .bind(vendor_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().flat_map(hosted_ids).collect())
    }
}

fn sort_clause(sort: Option<&str>) -> &'static str {
    match sort {
        Some("oldest") => "created_at ASC",
        Some("price_asc") => "price ASC",
        Some("price_desc") => "price DESC",
        Some("views") => "views DESC",
        Some("title") => "title ASC",
        // Unknown keys fall back to newest first
        _ => "created_at DESC",
    }
}

fn map_product(row: &PgRow) -> Product {
    let images: Vec<ProductImage> = row
        .try_get::<serde_json::Value, _>("images")
        .ok()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    Product {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        category_id: row.get("category_id"),
        vendor_id: row.get("vendor_id"),
        keywords: row.get("keywords"),
        images,
        price: row.get("price"),
        is_approved: row.get("is_approved"),
        approval_date: row.get("approval_date"),
        rejection_reason: row.get("rejection_reason"),
        views: row.get("views"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn hosted_ids(row: &PgRow) -> Vec<String> {
    row.try_get::<serde_json::Value, _>("images")
        .ok()
        .and_then(|v| serde_json::from_value::<Vec<ProductImage>>(v).ok())
        .map(|images| images.into_iter().map(|i| i.hosted_id).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_whitelist() {
        assert_eq!(sort_clause(Some("price_asc")), "price ASC");
        assert_eq!(sort_clause(Some("views")), "views DESC");
        assert_eq!(sort_clause(Some("title")), "title ASC");
        // Anything off the whitelist cannot reach the SQL string
        assert_eq!(sort_clause(Some("; DROP TABLE products")), "created_at DESC");
        assert_eq!(sort_clause(None), "created_at DESC");
    }
}
