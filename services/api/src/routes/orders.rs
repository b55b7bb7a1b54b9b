//! Order endpoints: public checkout and vendor fulfilment

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::Principal;
use crate::models::Paginated;
use crate::models::Pagination;
use crate::models::customer::{
    CreateOrderRequest, MarkDeliveredRequest, OrderStatusQuery, UpdateOrderRequest,
};
use crate::routes::admin::WindowQuery;
use crate::state::AppState;
use crate::validation::validate_email;

/// Place an order against a product (public)
pub async fn place_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }
    if payload.quantity < 1 {
        return Err(ApiError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let product = state
        .products
        .find_by_id(payload.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if !product.is_approved || !product.is_active {
        return Err(ApiError::Validation(
            "This product is not available for ordering".to_string(),
        ));
    }

    let order = state.customers.create(product.vendor_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": order })),
    ))
}

/// Public status lookup: order id plus the email used at checkout
pub async fn order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OrderStatusQuery>,
) -> ApiResult<impl IntoResponse> {
    let order = state
        .customers
        .find_by_id_and_email(id, &query.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": order.id,
            "delivered": order.delivered,
            "order_date": order.order_date,
            "quantity": order.quantity,
        },
    })))
}

/// Vendor order listing parameters
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub delivered: Option<bool>,
}

fn current_vendor_id(principal: &Principal) -> Result<Uuid, ApiError> {
    match principal {
        Principal::Vendor(vendor) => Ok(vendor.id),
        Principal::Admin(_) => Err(ApiError::Forbidden("Vendor access required".to_string())),
    }
}

/// List the caller's orders, newest first
pub async fn list_vendor_orders(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<impl IntoResponse> {
    let vendor_id = current_vendor_id(&principal)?;

    let (orders, total) = state
        .customers
        .list(Some(vendor_id), query.delivered, &query.pagination)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": Paginated::new(orders, total, &query.pagination),
    })))
}

/// Mark one order delivered
pub async fn mark_delivered(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let vendor_id = current_vendor_id(&principal)?;

    let updated = state.customers.mark_delivered(id, vendor_id).await?;
    if !updated {
        return Err(ApiError::NotFound("Order not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Order marked as delivered",
    })))
}

/// Mark a batch of orders delivered
pub async fn mark_delivered_bulk(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<MarkDeliveredRequest>,
) -> ApiResult<impl IntoResponse> {
    let vendor_id = current_vendor_id(&principal)?;

    if payload.order_ids.is_empty() {
        return Err(ApiError::Validation(
            "order_ids must not be empty".to_string(),
        ));
    }

    let updated = state
        .customers
        .mark_delivered_bulk(&payload.order_ids, vendor_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "updated": updated,
    })))
}

/// Admin order index parameters
#[derive(Debug, Deserialize)]
pub struct AdminOrderListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub delivered: Option<bool>,
    pub vendor_id: Option<Uuid>,
}

/// List orders across all vendors (admin)
pub async fn admin_list_orders(
    State(state): State<AppState>,
    Query(query): Query<AdminOrderListQuery>,
) -> ApiResult<impl IntoResponse> {
    let (orders, total) = state
        .customers
        .list(query.vendor_id, query.delivered, &query.pagination)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": Paginated::new(orders, total, &query.pagination),
    })))
}

/// Correct an order's details (admin)
pub async fn admin_update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(email) = &payload.email {
        validate_email(email).map_err(ApiError::Validation)?;
    }
    if let Some(quantity) = payload.quantity {
        if quantity < 1 {
            return Err(ApiError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }
    }

    let order = state
        .customers
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": order })))
}

/// Remove an order (admin)
pub async fn admin_delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.customers.delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Order not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Order deleted",
    })))
}

/// Platform-wide order counts (admin)
pub async fn admin_order_overview(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let overview = state.customers.overview(None).await?;
    Ok(Json(json!({ "success": true, "data": overview })))
}

/// Platform-wide orders per day (admin)
pub async fn admin_daily_orders(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<impl IntoResponse> {
    let points = state.customers.daily_orders(None, query.days).await?;
    Ok(Json(json!({ "success": true, "data": points })))
}

/// Most ordered products (admin)
pub async fn admin_top_products(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let top = state.customers.top_products(None, 10).await?;
    Ok(Json(json!({ "success": true, "data": top })))
}

/// Cities with the most orders (admin)
pub async fn admin_top_cities(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let top = state.customers.top_cities(None, 10).await?;
    Ok(Json(json!({ "success": true, "data": top })))
}
