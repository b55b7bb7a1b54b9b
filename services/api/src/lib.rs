//! Marketplace API service
//!
//! Vendor lifecycle (OTP signup, admin approval, subscription locks),
//! catalog, orders, and banners behind a role-guarded HTTP surface.

pub mod config;
pub mod email;
pub mod error;
pub mod images;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod subscription;
pub mod validation;
