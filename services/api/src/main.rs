use anyhow::Result;
use std::net::SocketAddr;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

use api::config::{AppConfig, ImageStoreConfig, MailConfig};
use api::email::EmailService;
use api::images::ImageStore;
use api::jwt::{JwtConfig, JwtService};
use api::rate_limiter::{RateLimiter, RateLimiterConfig};
use api::repositories::{
    admin::AdminRepository, approval_token::ApprovalTokenRepository, banner::BannerRepository,
    category::CategoryRepository, customer::CustomerRepository, otp::OtpRepository,
    pending_vendor::PendingVendorRepository, product::ProductRepository, vendor::VendorRepository,
};
use api::routes;
use api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting marketplace API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let config = AppConfig::from_env()?;
    let jwt = JwtService::new(JwtConfig::from_env()?);
    let email = EmailService::new(&MailConfig::from_env()?)?;

    let aws_config = aws_config::load_from_env().await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    let image_store = ImageStore::new(s3_client, &ImageStoreConfig::from_env()?);

    let app_state = AppState {
        db_pool: pool.clone(),
        config: config.clone(),
        jwt,
        email,
        image_store,
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        vendors: VendorRepository::new(pool.clone()),
        pending_vendors: PendingVendorRepository::new(pool.clone()),
        otps: OtpRepository::new(pool.clone()),
        approval_tokens: ApprovalTokenRepository::new(pool.clone()),
        categories: CategoryRepository::new(pool.clone()),
        products: ProductRepository::new(pool.clone()),
        customers: CustomerRepository::new(pool.clone()),
        banners: BannerRepository::new(pool.clone()),
        admins: AdminRepository::new(pool),
    };

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("API service listening on {}", config.bind_addr);

    // ConnectInfo feeds the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
