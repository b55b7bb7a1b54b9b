//! Service configuration loaded from environment variables

use anyhow::Result;
use std::env;

/// Top-level configuration for the API service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Public base URL used when building approval links
    pub base_url: String,
    /// Address that receives vendor approval requests
    pub admin_email: String,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:5000")
    /// - `BASE_URL`: public base URL for emailed links (default: "http://localhost:5000")
    /// - `ADMIN_EMAIL`: recipient of approval requests (default: "admin@openmarket.local")
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
        let admin_email =
            env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@openmarket.local".to_string());

        Ok(Self {
            bind_addr,
            base_url,
            admin_email,
        })
    }
}

/// SMTP configuration for the mailer
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// From address on outgoing mail
    pub from_address: String,
}

impl MailConfig {
    /// Create a new MailConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MAIL_HOST`: SMTP relay host (default: "smtp.gmail.com")
    /// - `MAIL_PORT`: SMTP port (default: 587)
    /// - `MAIL_USER`: SMTP username, also used as the from address
    /// - `MAIL_PASS`: SMTP password
    pub fn from_env() -> Result<Self> {
        let smtp_host = env::var("MAIL_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let smtp_port = env::var("MAIL_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .unwrap_or(587);
        let smtp_username = env::var("MAIL_USER")
            .map_err(|_| anyhow::anyhow!("MAIL_USER environment variable not set"))?;
        let smtp_password = env::var("MAIL_PASS")
            .map_err(|_| anyhow::anyhow!("MAIL_PASS environment variable not set"))?;
        let from_address =
            env::var("MAIL_FROM").unwrap_or_else(|_| smtp_username.clone());

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_address,
        })
    }
}

/// Image store (S3) configuration
#[derive(Debug, Clone)]
pub struct ImageStoreConfig {
    /// Bucket holding uploaded marketplace images
    pub bucket: String,
    /// Public URL prefix from which objects are served
    pub public_url_base: String,
}

impl ImageStoreConfig {
    /// Create a new ImageStoreConfig from environment variables
    ///
    /// # Environment Variables
    /// - `IMAGE_BUCKET_NAME`: S3 bucket (default: "openmarket-images")
    /// - `IMAGE_PUBLIC_URL`: public URL base (default derived from the bucket)
    pub fn from_env() -> Result<Self> {
        let bucket =
            env::var("IMAGE_BUCKET_NAME").unwrap_or_else(|_| "openmarket-images".to_string());
        let public_url_base = env::var("IMAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        Ok(Self {
            bucket,
            public_url_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_app_config_defaults() {
        unsafe {
            std::env::remove_var("BIND_ADDR");
            std::env::remove_var("BASE_URL");
            std::env::remove_var("ADMIN_EMAIL");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.admin_email, "admin@openmarket.local");
    }

    #[test]
    #[serial]
    fn test_app_config_from_env() {
        unsafe {
            std::env::set_var("BIND_ADDR", "127.0.0.1:8080");
            std::env::set_var("BASE_URL", "https://market.example.com");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.base_url, "https://market.example.com");

        unsafe {
            std::env::remove_var("BIND_ADDR");
            std::env::remove_var("BASE_URL");
        }
    }

    #[test]
    #[serial]
    fn test_mail_config_requires_credentials() {
        unsafe {
            std::env::remove_var("MAIL_USER");
            std::env::remove_var("MAIL_PASS");
        }

        assert!(MailConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_image_store_url_derived_from_bucket() {
        unsafe {
            std::env::set_var("IMAGE_BUCKET_NAME", "market-assets");
            std::env::remove_var("IMAGE_PUBLIC_URL");
        }

        let config = ImageStoreConfig::from_env().unwrap();
        assert_eq!(config.bucket, "market-assets");
        assert_eq!(
            config.public_url_base,
            "https://market-assets.s3.amazonaws.com"
        );

        unsafe {
            std::env::remove_var("IMAGE_BUCKET_NAME");
        }
    }
}
