//! Customer order model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub delivered: bool,
    pub order_date: DateTime<Utc>,
}

/// Order placement payload (public endpoint)
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Allow-listed order correction payload (admin)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    pub quantity: Option<i32>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub delivered: Option<bool>,
}

/// Order status lookup: id plus the email used at checkout
#[derive(Debug, Deserialize)]
pub struct OrderStatusQuery {
    pub email: String,
}

/// Bulk delivered marking
#[derive(Debug, Deserialize)]
pub struct MarkDeliveredRequest {
    pub order_ids: Vec<Uuid>,
}
