//! Customer order repository

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::Pagination;
use crate::models::customer::{CreateOrderRequest, CustomerOrder, UpdateOrderRequest};

/// Aggregate order counts
#[derive(Debug, Serialize)]
pub struct OrderOverview {
    pub total: i64,
    pub delivered: i64,
    pub pending: i64,
}

/// Orders placed per day
#[derive(Debug, Serialize)]
pub struct DailyOrders {
    pub day: DateTime<Utc>,
    pub count: i64,
}

/// Order volume per product
#[derive(Debug, Serialize)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub orders: i64,
    pub quantity: i64,
}

/// Order volume per city
#[derive(Debug, Serialize)]
pub struct TopCity {
    pub city: Option<String>,
    pub orders: i64,
}

/// Customer order repository
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Create a new customer order repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a placed order
    pub async fn create(&self, vendor_id: Uuid, payload: &CreateOrderRequest) -> Result<CustomerOrder> {
        info!("Recording order for vendor {}", vendor_id);

        let row = sqlx::query(
            r#"
            INSERT INTO customers
                (vendor_id, product_id, quantity, name, email, phone,
                 street, city, state, zip, country)
            VALUES ($1, $2, $3, $4, LOWER($5), $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .bind(payload.name.trim())
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.street)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.zip)
        .bind(&payload.country)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_order(&row))
    }

    /// Find an order by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerOrder>> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_order(&r)))
    }

    /// Public status lookup: the order id plus the checkout email
    pub async fn find_by_id_and_email(&self, id: Uuid, email: &str) -> Result<Option<CustomerOrder>> {
        let row = sqlx::query(
            "SELECT * FROM customers WHERE id = $1 AND LOWER(email) = LOWER($2)",
        )
        .bind(id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_order(&r)))
    }

    /// List orders, newest first.
    ///
    /// Vendor listings pass their own id; the admin index passes `None`
    /// or an explicit vendor scope.
    pub async fn list(
        &self,
        vendor_id: Option<Uuid>,
        delivered: Option<bool>,
        pagination: &Pagination,
    ) -> Result<(Vec<CustomerOrder>, i64)> {
        let (limit, offset) = pagination.clamped();

        let rows = sqlx::query(
            r#"
            SELECT * FROM customers
            WHERE ($1::uuid IS NULL OR vendor_id = $1)
              AND ($2::boolean IS NULL OR delivered = $2)
            ORDER BY order_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(vendor_id)
        .bind(delivered)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM customers
            WHERE ($1::uuid IS NULL OR vendor_id = $1)
              AND ($2::boolean IS NULL OR delivered = $2)
            "#,
        )
        .bind(vendor_id)
        .bind(delivered)
        .fetch_one(&self.pool)
        .await?
        .get("count");

        Ok((rows.iter().map(map_order).collect(), total))
    }

    /// Apply an allow-listed correction to an order (admin)
    pub async fn update(&self, id: Uuid, update: &UpdateOrderRequest) -> Result<Option<CustomerOrder>> {
        let row = sqlx::query(
            r#"
            UPDATE customers SET
                quantity = COALESCE($2, quantity),
                name = COALESCE($3, name),
                email = COALESCE(LOWER($4), email),
                phone = COALESCE($5, phone),
                street = COALESCE($6, street),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                zip = COALESCE($9, zip),
                country = COALESCE($10, country),
                delivered = COALESCE($11, delivered)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.quantity)
        .bind(update.name.as_ref().map(|n| n.trim().to_string()))
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.street)
        .bind(&update.city)
        .bind(&update.state)
        .bind(&update.zip)
        .bind(&update.country)
        .bind(update.delivered)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| map_order(&r)))
    }

    /// Remove one order (admin)
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark one order delivered, scoped to its vendor
    pub async fn mark_delivered(&self, id: Uuid, vendor_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE customers SET delivered = TRUE WHERE id = $1 AND vendor_id = $2")
                .bind(id)
                .bind(vendor_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a batch of orders delivered, scoped to their vendor
    pub async fn mark_delivered_bulk(&self, ids: &[Uuid], vendor_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE customers SET delivered = TRUE WHERE id = ANY($1) AND vendor_id = $2",
        )
        .bind(ids)
        .bind(vendor_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Drop a vendor's orders when the account is hard-deleted
    pub async fn delete_for_vendor(&self, vendor_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM customers WHERE vendor_id = $1")
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Aggregate counts, optionally scoped to one vendor
    pub async fn overview(&self, vendor_id: Option<Uuid>) -> Result<OrderOverview> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE delivered) AS delivered,
                COUNT(*) FILTER (WHERE NOT delivered) AS pending
            FROM customers
            WHERE ($1::uuid IS NULL OR vendor_id = $1)
            "#,
        )
        .bind(vendor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderOverview {
            total: row.get("total"),
            delivered: row.get("delivered"),
            pending: row.get("pending"),
        })
    }

    /// Orders per day over the trailing window
    pub async fn daily_orders(&self, vendor_id: Option<Uuid>, days: i64) -> Result<Vec<DailyOrders>> {
        let since = Utc::now() - Duration::days(days.clamp(1, 365));
        let rows = sqlx::query(
            r#"
            SELECT date_trunc('day', order_date) AS day, COUNT(*) AS count
            FROM customers
            WHERE order_date >= $1 AND ($2::uuid IS NULL OR vendor_id = $2)
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailyOrders {
                day: row.get("day"),
                count: row.get("count"),
            })
            .collect())
    }

    /// Most ordered products
    pub async fn top_products(&self, vendor_id: Option<Uuid>, limit: i64) -> Result<Vec<TopProduct>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, COUNT(*) AS orders, SUM(quantity)::bigint AS quantity
            FROM customers
            WHERE ($1::uuid IS NULL OR vendor_id = $1)
            GROUP BY product_id
            ORDER BY orders DESC
            LIMIT $2
            "#,
        )
        .bind(vendor_id)
        .bind(limit.clamp(1, 50))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopProduct {
                product_id: row.get("product_id"),
                orders: row.get("orders"),
                quantity: row.get("quantity"),
            })
            .collect())
    }

    /// Cities with the most orders
    pub async fn top_cities(&self, vendor_id: Option<Uuid>, limit: i64) -> Result<Vec<TopCity>> {
        let rows = sqlx::query(
            r#"
            SELECT city, COUNT(*) AS orders
            FROM customers
            WHERE ($1::uuid IS NULL OR vendor_id = $1)
            GROUP BY city
            ORDER BY orders DESC
            LIMIT $2
            "#,
        )
        .bind(vendor_id)
        .bind(limit.clamp(1, 50))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopCity {
                city: row.get("city"),
                orders: row.get("orders"),
            })
            .collect())
    }
}

fn map_order(row: &PgRow) -> CustomerOrder {
    CustomerOrder {
        id: row.get("id"),
        vendor_id: row.get("vendor_id"),
        product_id: row.get("product_id"),
        quantity: row.get("quantity"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        street: row.get("street"),
        city: row.get("city"),
        state: row.get("state"),
        zip: row.get("zip"),
        country: row.get("country"),
        delivered: row.get("delivered"),
        order_date: row.get("order_date"),
    }
}
