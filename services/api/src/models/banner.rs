//! Promotional banner model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::images::HostedImage;

/// Sold visibility terms, in days
pub const BANNER_VISIBILITY_DAYS: [i32; 6] = [7, 10, 12, 15, 17, 30];

/// Promotional banner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub vendor_id: Uuid,
    pub image: HostedImage,
    pub visibility_days: i32,
    pub expiry_date: DateTime<Utc>,
    pub is_visible: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Banner creation payload
#[derive(Debug, Deserialize)]
pub struct CreateBannerRequest {
    pub title: String,
    pub vendor_id: Uuid,
    pub image: HostedImage,
    pub visibility_days: i32,
}

/// Banner update payload
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBannerRequest {
    pub title: Option<String>,
    pub image: Option<HostedImage>,
    pub visibility_days: Option<i32>,
    pub is_visible: Option<bool>,
}

/// Whether a visibility term is one we sell
pub fn is_valid_visibility(days: i32) -> bool {
    BANNER_VISIBILITY_DAYS.contains(&days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_terms() {
        for days in BANNER_VISIBILITY_DAYS {
            assert!(is_valid_visibility(days));
        }
        assert!(!is_valid_visibility(5));
        assert!(!is_valid_visibility(31));
        assert!(!is_valid_visibility(0));
    }
}
