//! OTP verification record

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One live verification code per email address
#[derive(Debug, Clone, FromRow)]
pub struct OtpVerification {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub cooldown_start: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpVerification {
    /// Whether the code itself has lapsed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the record sits in the post-exhaustion cooldown window
    pub fn in_cooldown(&self, now: DateTime<Utc>, cooldown_seconds: i64) -> bool {
        match self.cooldown_start {
            Some(start) => now < start + chrono::Duration::seconds(cooldown_seconds),
            None => false,
        }
    }
}

/// Request body for the send-otp endpoint
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(now: DateTime<Utc>) -> OtpVerification {
        OtpVerification {
            id: Uuid::new_v4(),
            email: "vendor@example.com".to_string(),
            code: "123456".to_string(),
            attempts: 0,
            max_attempts: 5,
            cooldown_start: None,
            expires_at: now + Duration::seconds(120),
            created_at: now,
        }
    }

    #[test]
    fn test_expiry_window() {
        let now = Utc::now();
        let otp = record(now);
        assert!(!otp.is_expired(now));
        assert!(otp.is_expired(now + Duration::seconds(120)));
    }

    #[test]
    fn test_cooldown_window() {
        let now = Utc::now();
        let mut otp = record(now);
        assert!(!otp.in_cooldown(now, 300));

        otp.cooldown_start = Some(now);
        assert!(otp.in_cooldown(now + Duration::seconds(299), 300));
        assert!(!otp.in_cooldown(now + Duration::seconds(300), 300));
    }
}
