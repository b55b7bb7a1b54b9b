//! Product model and listing queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One image slot on a product, ordered by position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub hosted_id: String,
    pub url: String,
    pub position: u32,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub vendor_id: Uuid,
    pub keywords: Vec<String>,
    pub images: Vec<ProductImage>,
    pub price: f64,
    pub is_approved: bool,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub views: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product creation payload
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub price: f64,
}

/// Allow-listed product update payload
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub keywords: Option<Vec<String>>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

/// Listing filters layered on top of pagination
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive substring match on title and keywords
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    /// One of the whitelisted sort keys; anything else falls back to newest
    pub sort: Option<String>,
}

/// Replace or add an image at a position
#[derive(Debug, Deserialize)]
pub struct SetProductImageRequest {
    pub image: ProductImage,
}
