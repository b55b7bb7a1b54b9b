//! Subscription plan math and status classification
//!
//! A vendor's subscription is a pair of timestamps plus a plan name. All
//! status decisions are pure functions of those fields and the current
//! time, so handlers and guards share one source of truth.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Days left at which a subscription counts as "expiring soon"
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Derived subscription state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// No subscription has ever been recorded
    Inactive,
    /// The end date is in the past
    Expired,
    /// Active but within the warning window
    ExpiringSoon,
    /// Active with more than the warning window remaining
    Active,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::ExpiringSoon => "expiring_soon",
            SubscriptionStatus::Active => "active",
        }
    }
}

/// Classify a subscription window relative to `now`
pub fn subscription_status(
    end_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SubscriptionStatus {
    let Some(end) = end_date else {
        return SubscriptionStatus::Inactive;
    };

    if end <= now {
        return SubscriptionStatus::Expired;
    }

    let remaining = (end - now).num_days();
    if remaining <= EXPIRY_WARNING_DAYS {
        SubscriptionStatus::ExpiringSoon
    } else {
        SubscriptionStatus::Active
    }
}

/// Whole days remaining until the end date, clamped at zero
pub fn days_remaining(end_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match end_date {
        Some(end) if end > now => (end - now).num_days(),
        _ => 0,
    }
}

/// Map a purchased duration to its plan name.
///
/// Only 1, 3, 6, and 12 month terms are sold.
pub fn plan_for_duration(months: u32) -> Option<&'static str> {
    match months {
        1 => Some("basic_1m"),
        3 => Some("standard_3m"),
        6 => Some("premium_6m"),
        12 => Some("enterprise_12m"),
        _ => None,
    }
}

/// Calendar-aware end date for a subscription starting at `start`
pub fn subscription_end(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_status_without_subscription() {
        assert_eq!(
            subscription_status(None, at(2026, 1, 1)),
            SubscriptionStatus::Inactive
        );
    }

    #[test]
    fn test_status_expired() {
        let now = at(2026, 1, 10);
        assert_eq!(
            subscription_status(Some(at(2026, 1, 1)), now),
            SubscriptionStatus::Expired
        );
        // Exactly at the boundary counts as expired
        assert_eq!(
            subscription_status(Some(now), now),
            SubscriptionStatus::Expired
        );
    }

    #[test]
    fn test_status_expiring_soon_window() {
        let now = at(2026, 1, 1);
        assert_eq!(
            subscription_status(Some(now + Duration::days(3)), now),
            SubscriptionStatus::ExpiringSoon
        );
        assert_eq!(
            subscription_status(Some(now + Duration::days(7)), now),
            SubscriptionStatus::ExpiringSoon
        );
        assert_eq!(
            subscription_status(Some(now + Duration::days(8)), now),
            SubscriptionStatus::Active
        );
    }

    #[test]
    fn test_days_remaining_clamps_at_zero() {
        let now = at(2026, 1, 10);
        assert_eq!(days_remaining(Some(at(2026, 1, 1)), now), 0);
        assert_eq!(days_remaining(None, now), 0);
        assert_eq!(days_remaining(Some(now + Duration::days(30)), now), 30);
    }

    #[test]
    fn test_plan_for_duration() {
        assert_eq!(plan_for_duration(1), Some("basic_1m"));
        assert_eq!(plan_for_duration(3), Some("standard_3m"));
        assert_eq!(plan_for_duration(6), Some("premium_6m"));
        assert_eq!(plan_for_duration(12), Some("enterprise_12m"));
        assert_eq!(plan_for_duration(2), None);
        assert_eq!(plan_for_duration(0), None);
    }

    #[test]
    fn test_subscription_end_handles_month_lengths() {
        // Jan 31 + 1 month lands on Feb 28/29, not an invalid date
        let end = subscription_end(at(2026, 1, 31), 1);
        assert_eq!(end, at(2026, 2, 28));

        let year = subscription_end(at(2026, 3, 15), 12);
        assert_eq!(year, at(2027, 3, 15));
    }
}
