//! Public vendor directory

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::vendor::VendorPublic;
use crate::state::AppState;

/// Directory search parameters
#[derive(Debug, Deserialize)]
pub struct VendorSearchQuery {
    /// Substring match on company name and description
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// Search operating vendors (public)
pub async fn search_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorSearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let vendors = state
        .vendors
        .search_public(query.q.as_deref(), query.category_id, query.limit)
        .await?;

    let items: Vec<VendorPublic> = vendors.iter().map(VendorPublic::from_vendor).collect();

    Ok(Json(json!({ "success": true, "data": items })))
}

#[cfg(test)]
mod tests {
    use crate::models::vendor::{Vendor, VendorPublic};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_directory_entry_omits_private_fields() {
        let now = Utc::now();
        let vendor = Vendor {
            id: Uuid::new_v4(),
            email: "vendor@example.com".to_string(),
            password_hash: "secret".to_string(),
            phone: Some("+15550001111".to_string()),
            company_name: "Oak & Pine".to_string(),
            street: None,
            city: Some("Lisbon".to_string()),
            state: None,
            country: Some("PT".to_string()),
            postal_code: None,
            description: Some("Handmade furniture".to_string()),
            avatar: None,
            category_ids: vec![],
            is_active: true,
            is_approved: true,
            is_locked: false,
            approved_by: None,
            approved_at: Some(now),
            deactivated_at: None,
            deactivation_reason: None,
            locked_at: None,
            lock_reason: None,
            login_attempts: 0,
            lock_until: None,
            last_login: None,
            max_product_limit: 10,
            subscription_duration: Some(1),
            subscription_start: Some(now),
            subscription_end: None,
            last_purchase_date: None,
            total_purchases: 1,
            current_plan: Some("basic_1m".to_string()),
            created_at: now,
            updated_at: now,
        };

        let value =
            serde_json::to_value(VendorPublic::from_vendor(&vendor)).expect("serialize");
        let keys = value.as_object().expect("object");

        assert_eq!(keys["company_name"], "Oak & Pine");
        assert!(!keys.contains_key("email"));
        assert!(!keys.contains_key("phone"));
        assert!(!keys.contains_key("subscription_end"));
        assert!(!keys.contains_key("password_hash"));
    }
}
