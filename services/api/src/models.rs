//! Domain models and request/response payloads

use serde::{Deserialize, Serialize};

pub mod admin;
pub mod banner;
pub mod category;
pub mod customer;
pub mod otp;
pub mod pending_vendor;
pub mod product;
pub mod vendor;

/// Shared pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    /// Clamp inputs and compute the SQL offset
    pub fn clamped(&self) -> (i64, i64) {
        let limit = self.limit.clamp(1, 100) as i64;
        let page = self.page.max(1) as i64;
        (limit, (page - 1) * limit)
    }
}

/// Envelope for paginated list responses
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page.max(1),
            limit: pagination.limit.clamp(1, 100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamping() {
        let (limit, offset) = Pagination { page: 3, limit: 10 }.clamped();
        assert_eq!(limit, 10);
        assert_eq!(offset, 20);

        // Zero and oversized inputs are clamped
        let (limit, offset) = Pagination { page: 0, limit: 0 }.clamped();
        assert_eq!(limit, 1);
        assert_eq!(offset, 0);

        let (limit, _) = Pagination {
            page: 1,
            limit: 5000,
        }
        .clamped();
        assert_eq!(limit, 100);
    }
}
