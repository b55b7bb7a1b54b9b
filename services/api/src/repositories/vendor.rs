//! Vendor repository

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::images::HostedImage;
use crate::models::Pagination;
use crate::models::pending_vendor::PendingVendor;
use crate::models::vendor::{UpdateVendorProfile, Vendor};
use crate::subscription;

/// Failed logins before the account is throttled
pub const MAX_LOGIN_ATTEMPTS: i32 = 5;
/// Throttle duration after too many failed logins
pub const LOGIN_LOCK_HOURS: i64 = 2;

const PRODUCT_LIMIT_DEFAULT: i32 = 10;

/// Listing filters for the admin vendor index
#[derive(Debug, Default, Clone)]
pub struct VendorFilter {
    pub search: Option<String>,
    pub is_approved: Option<bool>,
    pub is_locked: Option<bool>,
    pub is_active: Option<bool>,
}

/// Aggregate counts for the admin dashboard
#[derive(Debug, Serialize)]
pub struct VendorOverview {
    pub total: i64,
    pub approved: i64,
    pub locked: i64,
    pub active: i64,
}

/// Daily registration count
#[derive(Debug, Serialize)]
pub struct RegistrationPoint {
    pub day: DateTime<Utc>,
    pub count: i64,
}

/// Vendors per subscription plan
#[derive(Debug, Serialize)]
pub struct PlanBreakdown {
    pub plan: Option<String>,
    pub count: i64,
}

/// Category popularity among vendors
#[derive(Debug, Serialize)]
pub struct CategoryUsage {
    pub category_id: Uuid,
    pub count: i64,
}

/// Vendor repository
#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    /// Create a new vendor repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Promote a pending vendor into a live, approved account.
    ///
    /// The new vendor starts with a 1-month basic plan and the default
    /// product quota.
    pub async fn create_from_pending(
        &self,
        pending: &PendingVendor,
        approved_by: &str,
    ) -> Result<Vendor> {
        info!("Promoting pending vendor: {}", pending.email);

        let now = Utc::now();
        let end = subscription::subscription_end(now, 1);
        let plan = subscription::plan_for_duration(1)
            .ok_or_else(|| anyhow::anyhow!("No plan for 1-month duration"))?;

        let row = sqlx::query(
            r#"
            INSERT INTO vendors (
                email, password_hash, phone, company_name, category_ids,
                description, is_approved, approved_by, approved_at,
                max_product_limit, subscription_duration, subscription_start,
                subscription_end, last_purchase_date, total_purchases, current_plan
            )
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8, $9, 1, $8, $10, $8, 1, $11)
            RETURNING *
            "#,
        )
        .bind(&pending.email)
        .bind(&pending.password_hash)
        .bind(&pending.phone)
        .bind(&pending.company_name)
        .bind(&pending.category_ids)
        .bind(&pending.description)
        .bind(approved_by)
        .bind(now)
        .bind(PRODUCT_LIMIT_DEFAULT)
        .bind(end)
        .bind(plan)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_vendor(&row))
    }

    /// Find a vendor by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>> {
        let row = sqlx::query("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_vendor(&r)))
    }

    /// Find a vendor by email, case-insensitively
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>> {
        let row = sqlx::query("SELECT * FROM vendors WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_vendor(&r)))
    }

    /// Whether any vendor uses this email
    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let row =
            sqlx::query("SELECT 1 AS one FROM vendors WHERE LOWER(email) = LOWER($1) LIMIT 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// List vendors with filters and pagination
    pub async fn list(
        &self,
        filter: &VendorFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<Vendor>, i64)> {
        let (limit, offset) = pagination.clamped();
        let search = filter
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.trim()));

        let rows = sqlx::query(
            r#"
            SELECT * FROM vendors
            WHERE ($1::text IS NULL OR company_name ILIKE $1 OR email ILIKE $1)
              AND ($2::boolean IS NULL OR is_approved = $2)
              AND ($3::boolean IS NULL OR is_locked = $3)
              AND ($4::boolean IS NULL OR is_active = $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(&search)
        .bind(filter.is_approved)
        .bind(filter.is_locked)
        .bind(filter.is_active)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM vendors
            WHERE ($1::text IS NULL OR company_name ILIKE $1 OR email ILIKE $1)
              AND ($2::boolean IS NULL OR is_approved = $2)
              AND ($3::boolean IS NULL OR is_locked = $3)
              AND ($4::boolean IS NULL OR is_active = $4)
            "#,
        )
        .bind(&search)
        .bind(filter.is_approved)
        .bind(filter.is_locked)
        .bind(filter.is_active)
        .fetch_one(&self.pool)
        .await?
        .get("count");

        Ok((rows.iter().map(map_vendor).collect(), total))
    }

    /// Public directory search over operating vendors.
    ///
    /// Only active, approved, unlocked accounts are searchable.
    pub async fn search_public(
        &self,
        term: Option<&str>,
        category_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Vendor>> {
        let pattern = term
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", t));

        let rows = sqlx::query(
            r#"
            SELECT * FROM vendors
            WHERE is_active AND is_approved AND NOT is_locked
              AND ($1::text IS NULL OR company_name ILIKE $1 OR description ILIKE $1)
              AND ($2::uuid IS NULL OR $2 = ANY(category_ids))
            ORDER BY company_name ASC
            LIMIT $3
            "#,
        )
        .bind(&pattern)
        .bind(category_id)
        .bind(limit.clamp(1, 50))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_vendor).collect())
    }

    /// Apply an allow-listed profile update
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &UpdateVendorProfile,
    ) -> Result<Option<Vendor>> {
        let row = sqlx::query(
            r#"
            UPDATE vendors SET
                phone = COALESCE($2, phone),
                company_name = COALESCE($3, company_name),
                street = COALESCE($4, street),
                city = COALESCE($5, city),
                state = COALESCE($6, state),
                country = COALESCE($7, country),
                postal_code = COALESCE($8, postal_code),
                description = COALESCE($9, description),
                category_ids = COALESCE($10, category_ids),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.phone)
        .bind(&update.company_name)
        .bind(&update.street)
        .bind(&update.city)
        .bind(&update.state)
        .bind(&update.country)
        .bind(&update.postal_code)
        .bind(&update.description)
        .bind(&update.category_ids)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| map_vendor(&r)))
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE vendors SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the account email
    pub async fn update_email(&self, id: Uuid, email: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE vendors SET email = LOWER($2), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set or clear the avatar image
    pub async fn update_avatar(&self, id: Uuid, avatar: Option<&HostedImage>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vendors SET avatar_hosted_id = $2, avatar_url = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(avatar.map(|a| a.hosted_id.clone()))
        .bind(avatar.map(|a| a.url.clone()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a failed login; throttles the account once attempts run out
    pub async fn record_login_failure(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE vendors SET
                login_attempts = login_attempts + 1,
                lock_until = CASE
                    WHEN login_attempts + 1 >= $2 THEN $3
                    ELSE lock_until
                END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(MAX_LOGIN_ATTEMPTS)
        .bind(Utc::now() + Duration::hours(LOGIN_LOCK_HOURS))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Clear the failed-login counter after a successful login
    pub async fn record_login_success(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE vendors SET
                login_attempts = 0,
                lock_until = NULL,
                last_login = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Lock or unlock a vendor account
    pub async fn set_lock(&self, id: Uuid, locked: bool, reason: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vendors SET
                is_locked = $2,
                lock_reason = $3,
                locked_at = CASE WHEN $2 THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(locked)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist the automatic lock applied when a subscription has expired
    pub async fn lock_for_subscription_expiry(&self, id: Uuid) -> Result<()> {
        info!("Locking vendor {} for expired subscription", id);
        self.set_lock(id, true, Some("subscription_expired")).await?;
        Ok(())
    }

    /// Toggle the approval flag on an existing vendor
    pub async fn set_approval(&self, id: Uuid, approved: bool, approved_by: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vendors SET
                is_approved = $2,
                approved_by = CASE WHEN $2 THEN $3 ELSE approved_by END,
                approved_at = CASE WHEN $2 THEN NOW() ELSE approved_at END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(approved)
        .bind(approved_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Assign a fresh subscription term.
    ///
    /// Recomputes the end date from now, bumps the purchase counter, and
    /// clears a lock that came from subscription expiry.
    pub async fn update_subscription(&self, id: Uuid, duration_months: u32) -> Result<Option<Vendor>> {
        let plan = subscription::plan_for_duration(duration_months)
            .ok_or_else(|| anyhow::anyhow!("Invalid subscription duration: {}", duration_months))?;
        let now = Utc::now();
        let end = subscription::subscription_end(now, duration_months);

        let row = sqlx::query(
            r#"
            UPDATE vendors SET
                subscription_duration = $2,
                subscription_start = $3,
                subscription_end = $4,
                last_purchase_date = $3,
                total_purchases = total_purchases + 1,
                current_plan = $5,
                is_locked = CASE WHEN lock_reason = 'subscription_expired' THEN FALSE ELSE is_locked END,
                lock_reason = CASE WHEN lock_reason = 'subscription_expired' THEN NULL ELSE lock_reason END,
                locked_at = CASE WHEN lock_reason = 'subscription_expired' THEN NULL ELSE locked_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(duration_months as i32)
        .bind(now)
        .bind(end)
        .bind(plan)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| map_vendor(&r)))
    }

    /// Soft-deactivate an account, keeping the record
    pub async fn deactivate(&self, id: Uuid, reason: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vendors SET
                is_active = FALSE,
                deactivated_at = NOW(),
                deactivation_reason = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reactivate a soft-deactivated account
    pub async fn reactivate(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vendors SET
                is_active = TRUE,
                deactivated_at = NULL,
                deactivation_reason = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a vendor row
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting vendor: {}", id);
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Aggregate counts for the admin dashboard
    pub async fn overview(&self) -> Result<VendorOverview> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_approved) AS approved,
                COUNT(*) FILTER (WHERE is_locked) AS locked,
                COUNT(*) FILTER (WHERE is_active) AS active
            FROM vendors
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(VendorOverview {
            total: row.get("total"),
            approved: row.get("approved"),
            locked: row.get("locked"),
            active: row.get("active"),
        })
    }

    /// Daily registrations over the trailing window
    pub async fn registrations(&self, days: i64) -> Result<Vec<RegistrationPoint>> {
        let since = Utc::now() - Duration::days(days.clamp(1, 365));
        let rows = sqlx::query(
            r#"
            SELECT date_trunc('day', created_at) AS day, COUNT(*) AS count
            FROM vendors
            WHERE created_at >= $1
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RegistrationPoint {
                day: row.get("day"),
                count: row.get("count"),
            })
            .collect())
    }

    /// Vendors per subscription plan
    pub async fn plan_breakdown(&self) -> Result<Vec<PlanBreakdown>> {
        let rows = sqlx::query(
            r#"
            SELECT current_plan AS plan, COUNT(*) AS count
            FROM vendors
            GROUP BY current_plan
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PlanBreakdown {
                plan: row.get("plan"),
                count: row.get("count"),
            })
            .collect())
    }

    /// Most used categories across vendor profiles
    pub async fn top_categories(&self, limit: i64) -> Result<Vec<CategoryUsage>> {
        let rows = sqlx::query(
            r#"
            SELECT category_id, COUNT(*) AS count
            FROM vendors, UNNEST(category_ids) AS category_id
            GROUP BY category_id
            ORDER BY count DESC
            LIMIT $1
            "#,
        )
        .bind(limit.clamp(1, 50))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryUsage {
                category_id: row.get("category_id"),
                count: row.get("count"),
            })
            .collect())
    }
}

fn map_vendor(row: &PgRow) -> Vendor {
    let avatar = match (
        row.get::<Option<String>, _>("avatar_hosted_id"),
        row.get::<Option<String>, _>("avatar_url"),
    ) {
        (Some(hosted_id), Some(url)) => Some(HostedImage { hosted_id, url }),
        _ => None,
    };

    Vendor {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        phone: row.get("phone"),
        company_name: row.get("company_name"),
        street: row.get("street"),
        city: row.get("city"),
        state: row.get("state"),
        country: row.get("country"),
        postal_code: row.get("postal_code"),
        description: row.get("description"),
        avatar,
        category_ids: row.get("category_ids"),
        is_active: row.get("is_active"),
        is_approved: row.get("is_approved"),
        is_locked: row.get("is_locked"),
        approved_by: row.get("approved_by"),
        approved_at: row.get("approved_at"),
        deactivated_at: row.get("deactivated_at"),
        deactivation_reason: row.get("deactivation_reason"),
        locked_at: row.get("locked_at"),
        lock_reason: row.get("lock_reason"),
        login_attempts: row.get("login_attempts"),
        lock_until: row.get("lock_until"),
        last_login: row.get("last_login"),
        max_product_limit: row.get("max_product_limit"),
        subscription_duration: row.get("subscription_duration"),
        subscription_start: row.get("subscription_start"),
        subscription_end: row.get("subscription_end"),
        last_purchase_date: row.get("last_purchase_date"),
        total_purchases: row.get("total_purchases"),
        current_plan: row.get("current_plan"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
