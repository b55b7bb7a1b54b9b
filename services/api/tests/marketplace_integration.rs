//! Integration tests for database-backed invariants
//!
//! These tests verify the persistence properties of the vendor lock
//! engine, the one-time credentials, and the product quota. They require
//! a live database and are ignored by default.

use axum::http::StatusCode;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use common::database::{DatabaseConfig, init_pool};

use api::error::ApiError;
use api::models::customer::{CreateOrderRequest, UpdateOrderRequest};
use api::models::pending_vendor::NewPendingVendor;
use api::models::product::CreateProductRequest;
use api::models::vendor::Vendor;
use api::otp::generate_approval_token;
use api::repositories::approval_token::ApprovalTokenRepository;
use api::repositories::customer::CustomerRepository;
use api::repositories::hash_password;
use api::repositories::otp::OtpRepository;
use api::repositories::pending_vendor::PendingVendorRepository;
use api::repositories::product::ProductRepository;
use api::repositories::vendor::VendorRepository;
use api::routes::products::quota_reached;
use api::subscription::SubscriptionStatus;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn test_pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    Ok(init_pool(&config).await?)
}

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

/// Stage and promote a vendor, as the approval flow does
async fn approved_vendor(pool: &PgPool, prefix: &str) -> Result<Vendor, Box<dyn std::error::Error>> {
    let pending_vendors = PendingVendorRepository::new(pool.clone());
    let vendors = VendorRepository::new(pool.clone());

    let pending = pending_vendors
        .create(&NewPendingVendor {
            email: unique_email(prefix),
            password_hash: hash_password("Str0ng!pass")?,
            phone: None,
            company_name: format!("{} Works", prefix),
            category_ids: vec![],
            description: None,
        })
        .await?;

    let vendor = vendors.create_from_pending(&pending, "integration-tests").await?;
    pending_vendors.delete(pending.id).await?;
    Ok(vendor)
}

async fn seed_category(pool: &PgPool) -> Result<Uuid, Box<dyn std::error::Error>> {
    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO categories (name) VALUES ($1) RETURNING id",
    )
    .bind(format!("test-category-{}", Uuid::new_v4().simple()))
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

async fn cleanup_vendor(pool: &PgPool, vendor_id: Uuid) -> TestResult {
    let products = ProductRepository::new(pool.clone());
    let customers = CustomerRepository::new(pool.clone());
    let vendors = VendorRepository::new(pool.clone());

    products.delete_for_vendor(vendor_id).await?;
    customers.delete_for_vendor(vendor_id).await?;
    vendors.delete(vendor_id).await?;
    Ok(())
}

/// A vendor whose subscription has lapsed gets a persisted lock, and a
/// fresh subscription clears it again
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_expired_subscription_lock_is_persisted() -> TestResult {
    let pool = test_pool().await?;
    let vendors = VendorRepository::new(pool.clone());
    let vendor = approved_vendor(&pool, "expiry").await?;

    sqlx::query("UPDATE vendors SET subscription_end = NOW() - INTERVAL '1 day' WHERE id = $1")
        .bind(vendor.id)
        .execute(&pool)
        .await?;

    let stale = vendors.find_by_id(vendor.id).await?.expect("vendor exists");
    assert_eq!(stale.subscription_status(Utc::now()), SubscriptionStatus::Expired);

    // What the vendor guard does on first access after expiry
    vendors.lock_for_subscription_expiry(vendor.id).await?;

    let locked = vendors.find_by_id(vendor.id).await?.expect("vendor exists");
    assert!(locked.is_locked);
    assert_eq!(locked.lock_reason.as_deref(), Some("subscription_expired"));

    // A new term lifts the expiry lock
    let renewed = vendors
        .update_subscription(vendor.id, 3)
        .await?
        .expect("vendor exists");
    assert!(!renewed.is_locked);
    assert_eq!(renewed.lock_reason, None);
    assert_eq!(renewed.current_plan.as_deref(), Some("standard_3m"));

    cleanup_vendor(&pool, vendor.id).await
}

/// The quota check fires before any insert, so a vendor at the limit
/// gains no rows from a rejected create
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_product_quota_rejection_persists_nothing() -> TestResult {
    let pool = test_pool().await?;
    let products = ProductRepository::new(pool.clone());
    let vendor = approved_vendor(&pool, "quota").await?;
    let category_id = seed_category(&pool).await?;

    sqlx::query("UPDATE vendors SET max_product_limit = 1 WHERE id = $1")
        .bind(vendor.id)
        .execute(&pool)
        .await?;

    products
        .create(
            vendor.id,
            &format!("first-{}", Uuid::new_v4().simple()),
            &CreateProductRequest {
                title: "First".to_string(),
                description: None,
                category_id,
                keywords: vec![],
                images: vec![],
                price: 10.0,
            },
        )
        .await?;

    let count = products.count_for_vendor(vendor.id).await?;
    assert!(quota_reached(count, 1));

    // The handler refuses here; no second insert happens
    assert_eq!(products.count_for_vendor(vendor.id).await?, 1);

    cleanup_vendor(&pool, vendor.id).await?;
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(&pool)
        .await?;
    Ok(())
}

/// A verified code is deleted on use and cannot be replayed
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_otp_code_is_single_use() -> TestResult {
    let pool = test_pool().await?;
    let otps = OtpRepository::new(pool.clone());
    let email = unique_email("otp");

    let otp = otps.create(&email, "123456").await?;
    assert!(otps.find_live(&email).await?.is_some());

    // What signup does after a successful verification
    assert!(otps.delete(otp.id).await?);
    assert!(otps.find_live(&email).await?.is_none());
    Ok(())
}

/// An expired code survives pruning only while its cooldown holds
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_dead_otp_rows_are_pruned_after_cooldown() -> TestResult {
    let pool = test_pool().await?;
    let otps = OtpRepository::new(pool.clone());
    let email = unique_email("otp-prune");

    let otp = otps.create(&email, "654321").await?;
    sqlx::query(
        "UPDATE otp_verifications SET expires_at = NOW() - INTERVAL '1 minute', \
         cooldown_start = NOW() WHERE id = $1",
    )
    .bind(otp.id)
    .execute(&pool)
    .await?;

    // The cooldown keeps the dead row, blocking a fresh code
    assert!(otps.find_live(&email).await?.is_some());

    sqlx::query(
        "UPDATE otp_verifications SET cooldown_start = NOW() - INTERVAL '6 minutes' WHERE id = $1",
    )
    .bind(otp.id)
    .execute(&pool)
    .await?;

    // Cooldown lapsed, so the next touch prunes it
    assert!(otps.find_live(&email).await?.is_none());
    Ok(())
}

/// Consuming an approval token deletes it, so the second click on an
/// emailed link finds nothing
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_approval_token_cannot_be_consumed_twice() -> TestResult {
    let pool = test_pool().await?;
    let pending_vendors = PendingVendorRepository::new(pool.clone());
    let tokens = ApprovalTokenRepository::new(pool.clone());

    let pending = pending_vendors
        .create(&NewPendingVendor {
            email: unique_email("token"),
            password_hash: hash_password("Str0ng!pass")?,
            phone: None,
            company_name: "Token Works".to_string(),
            category_ids: vec![],
            description: None,
        })
        .await?;

    let token = generate_approval_token();
    tokens.create(pending.id, &token).await?;

    assert!(tokens.consume(pending.id, &token).await?.is_some());
    assert!(tokens.consume(pending.id, &token).await?.is_none());

    pending_vendors.delete(pending.id).await?;
    Ok(())
}

/// A duplicate slug surfaces as a conflict, not a server error
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_duplicate_slug_maps_to_conflict() -> TestResult {
    let pool = test_pool().await?;
    let products = ProductRepository::new(pool.clone());
    let vendor = approved_vendor(&pool, "slug").await?;
    let category_id = seed_category(&pool).await?;

    let slug = format!("collision-{}", Uuid::new_v4().simple());
    let request = CreateProductRequest {
        title: "Colliding".to_string(),
        description: None,
        category_id,
        keywords: vec![],
        images: vec![],
        price: 10.0,
    };

    products.create(vendor.id, &slug, &request).await?;

    let err = products
        .create(vendor.id, &slug, &request)
        .await
        .expect_err("duplicate slug must fail");
    let api_err = ApiError::from(err);
    assert_eq!(api_err.status_code(), StatusCode::CONFLICT);

    cleanup_vendor(&pool, vendor.id).await?;
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(&pool)
        .await?;
    Ok(())
}

/// Admins can correct and remove an order
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_admin_order_correction_and_removal() -> TestResult {
    let pool = test_pool().await?;
    let customers = CustomerRepository::new(pool.clone());
    let vendor = approved_vendor(&pool, "orders").await?;

    let order = customers
        .create(
            vendor.id,
            &CreateOrderRequest {
                product_id: Uuid::new_v4(),
                quantity: 1,
                name: "Jamie Buyer".to_string(),
                email: unique_email("buyer"),
                phone: None,
                street: None,
                city: Some("Lisbon".to_string()),
                state: None,
                zip: None,
                country: None,
            },
        )
        .await?;

    let corrected = customers
        .update(
            order.id,
            &UpdateOrderRequest {
                quantity: Some(3),
                delivered: Some(true),
                ..Default::default()
            },
        )
        .await?
        .expect("order exists");
    assert_eq!(corrected.quantity, 3);
    assert!(corrected.delivered);

    assert!(customers.delete(order.id).await?);
    assert!(customers.find_by_id(order.id).await?.is_none());

    cleanup_vendor(&pool, vendor.id).await
}
