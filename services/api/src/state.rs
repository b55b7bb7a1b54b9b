//! Application state shared across handlers

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::email::EmailService;
use crate::images::ImageStore;
use crate::jwt::JwtService;
use crate::rate_limiter::RateLimiter;
use crate::repositories::{
    admin::AdminRepository, approval_token::ApprovalTokenRepository, banner::BannerRepository,
    category::CategoryRepository, customer::CustomerRepository, otp::OtpRepository,
    pending_vendor::PendingVendorRepository, product::ProductRepository, vendor::VendorRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: AppConfig,
    pub jwt: JwtService,
    pub email: EmailService,
    pub image_store: ImageStore,
    pub rate_limiter: RateLimiter,
    pub vendors: VendorRepository,
    pub pending_vendors: PendingVendorRepository,
    pub otps: OtpRepository,
    pub approval_tokens: ApprovalTokenRepository,
    pub categories: CategoryRepository,
    pub products: ProductRepository,
    pub customers: CustomerRepository,
    pub banners: BannerRepository,
    pub admins: AdminRepository,
}
