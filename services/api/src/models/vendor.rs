//! Vendor model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::images::HostedImage;
use crate::subscription::{SubscriptionStatus, days_remaining, subscription_status};

/// Vendor entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub company_name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<HostedImage>,
    pub category_ids: Vec<Uuid>,
    pub is_active: bool,
    pub is_approved: bool,
    pub is_locked: bool,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivation_reason: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub lock_reason: Option<String>,
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub max_product_limit: i32,
    pub subscription_duration: Option<i32>,
    pub subscription_start: Option<DateTime<Utc>>,
    pub subscription_end: Option<DateTime<Utc>>,
    pub last_purchase_date: Option<DateTime<Utc>>,
    pub total_purchases: i32,
    pub current_plan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Explicit lifecycle state, derived from the persisted flags.
///
/// The row keeps booleans so admin toggles stay single-column updates;
/// this classification is the one view the guards and responses use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VendorStatus {
    /// Approved but switched off by the vendor
    Deactivated { reason: Option<String> },
    /// Live record without approval (revoked by an admin)
    PendingApproval,
    /// Blocked, either by an admin or by subscription expiry
    Locked { reason: Option<String> },
    /// Operating, with the current subscription state attached
    Active { subscription: SubscriptionStatus },
}

impl Vendor {
    /// Classify the account at `now`
    pub fn status(&self, now: DateTime<Utc>) -> VendorStatus {
        if !self.is_active {
            return VendorStatus::Deactivated {
                reason: self.deactivation_reason.clone(),
            };
        }
        if !self.is_approved {
            return VendorStatus::PendingApproval;
        }
        if self.is_locked {
            return VendorStatus::Locked {
                reason: self.lock_reason.clone(),
            };
        }
        VendorStatus::Active {
            subscription: self.subscription_status(now),
        }
    }

    /// Derived subscription state at `now`
    pub fn subscription_status(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        subscription_status(self.subscription_end, now)
    }

    /// Whole days left on the subscription at `now`
    pub fn subscription_days_remaining(&self, now: DateTime<Utc>) -> i64 {
        days_remaining(self.subscription_end, now)
    }
}

/// Vendor as returned to API callers
#[derive(Debug, Serialize)]
pub struct VendorResponse {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<HostedImage>,
    pub category_ids: Vec<Uuid>,
    pub is_active: bool,
    pub is_approved: bool,
    pub is_locked: bool,
    pub lock_reason: Option<String>,
    pub max_product_limit: i32,
    pub subscription_status: SubscriptionStatus,
    pub subscription_end: Option<DateTime<Utc>>,
    pub subscription_days_remaining: i64,
    pub current_plan: Option<String>,
    pub total_purchases: i32,
    pub created_at: DateTime<Utc>,
}

impl VendorResponse {
    pub fn from_vendor(vendor: &Vendor, now: DateTime<Utc>) -> Self {
        Self {
            id: vendor.id,
            email: vendor.email.clone(),
            phone: vendor.phone.clone(),
            company_name: vendor.company_name.clone(),
            street: vendor.street.clone(),
            city: vendor.city.clone(),
            state: vendor.state.clone(),
            country: vendor.country.clone(),
            postal_code: vendor.postal_code.clone(),
            description: vendor.description.clone(),
            avatar: vendor.avatar.clone(),
            category_ids: vendor.category_ids.clone(),
            is_active: vendor.is_active,
            is_approved: vendor.is_approved,
            is_locked: vendor.is_locked,
            lock_reason: vendor.lock_reason.clone(),
            max_product_limit: vendor.max_product_limit,
            subscription_status: vendor.subscription_status(now),
            subscription_end: vendor.subscription_end,
            subscription_days_remaining: vendor.subscription_days_remaining(now),
            current_plan: vendor.current_plan.clone(),
            total_purchases: vendor.total_purchases,
            created_at: vendor.created_at,
        }
    }
}

/// Vendor as shown in the public directory.
///
/// Contact and subscription details stay off this surface.
#[derive(Debug, Serialize)]
pub struct VendorPublic {
    pub id: Uuid,
    pub company_name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<HostedImage>,
    pub category_ids: Vec<Uuid>,
}

impl VendorPublic {
    pub fn from_vendor(vendor: &Vendor) -> Self {
        Self {
            id: vendor.id,
            company_name: vendor.company_name.clone(),
            city: vendor.city.clone(),
            country: vendor.country.clone(),
            description: vendor.description.clone(),
            avatar: vendor.avatar.clone(),
            category_ids: vendor.category_ids.clone(),
        }
    }
}

/// Login request for vendors and admins
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Allow-listed profile update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVendorProfile {
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub description: Option<String>,
    pub category_ids: Option<Vec<Uuid>>,
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Email change request
#[derive(Debug, Deserialize)]
pub struct ChangeEmailRequest {
    pub new_email: String,
    pub password: String,
}

/// Account deactivation request
#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    pub reason: Option<String>,
}

/// Admin subscription assignment
#[derive(Debug, Deserialize)]
pub struct SubscriptionUpdateRequest {
    /// Purchased term in months: 1, 3, 6, or 12
    pub duration_months: u32,
}

/// Admin lock/unlock request
#[derive(Debug, Deserialize)]
pub struct LockRequest {
    pub locked: bool,
    pub reason: Option<String>,
    /// Unlock even when the lock came from subscription expiry
    #[serde(default)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn active_vendor(now: DateTime<Utc>) -> Vendor {
        Vendor {
            id: Uuid::new_v4(),
            email: "vendor@example.com".to_string(),
            password_hash: String::new(),
            phone: None,
            company_name: "Oak & Pine".to_string(),
            street: None,
            city: None,
            state: None,
            country: None,
            postal_code: None,
            description: None,
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
            subscription_end: Some(now + Duration::days(30)),
            last_purchase_date: Some(now),
            total_purchases: 1,
            current_plan: Some("basic_1m".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_active() {
        let now = Utc::now();
        let vendor = active_vendor(now);

        assert_eq!(
            vendor.status(now),
            VendorStatus::Active {
                subscription: SubscriptionStatus::Active
            }
        );
    }

    #[test]
    fn test_status_deactivation_outranks_lock() {
        let now = Utc::now();
        let mut vendor = active_vendor(now);
        vendor.is_active = false;
        vendor.deactivation_reason = Some("taking a break".to_string());
        vendor.is_locked = true;

        assert_eq!(
            vendor.status(now),
            VendorStatus::Deactivated {
                reason: Some("taking a break".to_string())
            }
        );
    }

    #[test]
    fn test_status_locked_carries_reason() {
        let now = Utc::now();
        let mut vendor = active_vendor(now);
        vendor.is_locked = true;
        vendor.lock_reason = Some("subscription_expired".to_string());

        assert_eq!(
            vendor.status(now),
            VendorStatus::Locked {
                reason: Some("subscription_expired".to_string())
            }
        );
    }

    #[test]
    fn test_status_expired_subscription_surfaces_in_active() {
        let now = Utc::now();
        let mut vendor = active_vendor(now);
        vendor.subscription_end = Some(now - Duration::days(1));

        assert_eq!(
            vendor.status(now),
            VendorStatus::Active {
                subscription: SubscriptionStatus::Expired
            }
        );
    }

    #[test]
    fn test_status_unapproved() {
        let now = Utc::now();
        let mut vendor = active_vendor(now);
        vendor.is_approved = false;

        assert_eq!(vendor.status(now), VendorStatus::PendingApproval);
    }
}
