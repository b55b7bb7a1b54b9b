//! HTTP surface: routers and handlers
//!
//! Role-scoped prefixes under `/api`: public endpoints (with a rate
//! limiter on signup and login), vendor endpoints behind the full vendor
//! guard, admin endpoints behind the admin guard, and the two
//! unauthenticated HTML endpoints that consume emailed approval links.

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::middleware::{
    rate_limit, require_admin, require_vendor, require_vendor_credential, require_vendor_or_admin,
};
use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod banners;
pub mod categories;
pub mod orders;
pub mod products;
pub mod profile;
pub mod signup;
pub mod uploads;
pub mod vendors;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let throttled = Router::new()
        .route("/api/auth/login", post(auth::vendor_login))
        .route("/api/auth/admin/login", post(auth::admin_login))
        .route("/api/signup/send-otp", post(signup::send_otp))
        .route("/api/signup", post(signup::signup))
        .route_layer(from_fn_with_state(state.clone(), rate_limit));

    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/admin/approve", get(admin::approve_via_link))
        .route("/api/admin/deny", get(admin::deny_via_link))
        .route("/api/categories", get(categories::list_categories))
        .route("/api/categories/:id", get(categories::get_category))
        .route("/api/products", get(products::list_products))
        .route("/api/products/:id", get(products::get_product))
        .route("/api/products/slug/:slug", get(products::get_product_by_slug))
        .route("/api/banners", get(banners::list_visible_banners))
        .route("/api/banners/:id", get(banners::get_banner))
        .route("/api/vendors/search", get(vendors::search_vendors))
        .route("/api/orders", post(orders::place_order))
        .route("/api/orders/:id/status", get(orders::order_status));

    let vendor = Router::new()
        .route("/api/profile", get(profile::get_profile))
        .route("/api/profile", put(profile::update_profile))
        .route("/api/profile/password", put(profile::change_password))
        .route("/api/profile/email", put(profile::change_email))
        .route("/api/profile/avatar", put(profile::set_avatar))
        .route("/api/profile/avatar", delete(profile::delete_avatar))
        .route("/api/profile/dashboard", get(profile::dashboard))
        .route("/api/profile/deactivate", post(profile::deactivate_account))
        .route("/api/profile", delete(profile::delete_account))
        .route("/api/vendor/products", get(products::list_own_products))
        .route("/api/vendor/products", post(products::create_product))
        .route("/api/vendor/products/:id", put(products::update_product))
        .route("/api/vendor/products/:id", delete(products::delete_product))
        .route(
            "/api/vendor/products/:id/images/:position",
            put(products::set_product_image),
        )
        .route(
            "/api/vendor/products/:id/images/:position",
            delete(products::remove_product_image),
        )
        .route("/api/vendor/orders", get(orders::list_vendor_orders))
        .route(
            "/api/vendor/orders/:id/delivered",
            put(orders::mark_delivered),
        )
        .route(
            "/api/vendor/orders/delivered",
            put(orders::mark_delivered_bulk),
        )
        .route_layer(from_fn_with_state(state.clone(), require_vendor));

    // Deactivated vendors must still reach this one
    let vendor_credential = Router::new()
        .route("/api/profile/reactivate", post(profile::reactivate_account))
        .route_layer(from_fn_with_state(state.clone(), require_vendor_credential));

    let admin_routes = Router::new()
        .route("/api/admin/pending-vendors", get(admin::list_pending_vendors))
        .route(
            "/api/admin/pending-vendors/:id/approve",
            post(admin::approve_pending),
        )
        .route(
            "/api/admin/pending-vendors/:id/deny",
            post(admin::deny_pending),
        )
        .route("/api/admin/vendors", get(admin::list_vendors))
        .route("/api/admin/vendors/:id", get(admin::get_vendor))
        .route("/api/admin/vendors/:id", put(admin::update_vendor))
        .route("/api/admin/vendors/:id", delete(admin::delete_vendor))
        .route("/api/admin/vendors/:id/approval", put(admin::set_vendor_approval))
        .route("/api/admin/vendors/:id/lock", put(admin::set_vendor_lock))
        .route(
            "/api/admin/vendors/:id/subscription",
            put(admin::update_vendor_subscription),
        )
        .route("/api/admin/categories", post(categories::create_category))
        .route("/api/admin/categories/:id", put(categories::update_category))
        .route("/api/admin/categories/:id", delete(categories::delete_category))
        .route("/api/admin/products/:id/approval", put(products::set_product_approval))
        .route("/api/admin/banners", get(banners::list_all_banners))
        .route("/api/admin/banners", post(banners::create_banner))
        .route("/api/admin/banners/:id", put(banners::update_banner))
        .route("/api/admin/banners/:id", delete(banners::delete_banner))
        .route("/api/admin/banners/stats", get(banners::banner_stats))
        .route("/api/admin/analytics/vendors", get(admin::vendor_overview))
        .route(
            "/api/admin/analytics/registrations",
            get(admin::vendor_registrations),
        )
        .route("/api/admin/analytics/plans", get(admin::plan_breakdown))
        .route(
            "/api/admin/analytics/top-categories",
            get(admin::top_categories),
        )
        .route("/api/admin/orders", get(orders::admin_list_orders))
        .route("/api/admin/orders/:id", put(orders::admin_update_order))
        .route("/api/admin/orders/:id", delete(orders::admin_delete_order))
        .route("/api/admin/analytics/orders", get(orders::admin_order_overview))
        .route("/api/admin/analytics/orders/daily", get(orders::admin_daily_orders))
        .route("/api/admin/analytics/orders/top-products", get(orders::admin_top_products))
        .route("/api/admin/analytics/orders/top-cities", get(orders::admin_top_cities))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    // The body cap must exceed the upload size check or it would win first
    let shared = Router::new()
        .route("/api/uploads", post(uploads::upload_image))
        .route_layer(from_fn_with_state(state.clone(), require_vendor_or_admin))
        .layer(DefaultBodyLimit::max(uploads::MAX_BODY_BYTES));

    Router::new()
        .merge(throttled)
        .merge(public)
        .merge(vendor)
        .merge(vendor_credential)
        .merge(admin_routes)
        .merge(shared)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "openmarket-api"
    }))
}
