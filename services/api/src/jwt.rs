//! JWT service for session token generation and validation
//!
//! Tokens are signed with HS256 using a shared secret and carry the
//! principal's id, role, and email. They are accepted from either the
//! `token` cookie or a `Bearer` header.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing tokens
    pub secret: String,
    /// Token expiration time in seconds (default: 30 days)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `TOKEN_SECRET`: shared HS256 signing secret
    /// - `TOKEN_EXPIRY`: token lifetime in seconds (default: 2592000)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("TOKEN_SECRET environment variable not set"))?;

        let token_expiry = std::env::var("TOKEN_EXPIRY")
            .unwrap_or_else(|_| "2592000".to_string()) // 30 days
            .parse()
            .unwrap_or(2_592_000);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// Principal role carried in the token
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Seller tenant
    Vendor,
    /// Platform operator
    SuperAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Vendor => write!(f, "vendor"),
            Role::SuperAdmin => write!(f, "superadmin"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal ID
    pub sub: Uuid,
    /// Principal role
    pub role: Role,
    /// Principal email
    pub email: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Generate a session token for a principal
    pub fn generate_token(&self, id: Uuid, role: Role, email: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: id,
            role,
            email: email.to_string(),
            iat: now,
            exp: now + self.config.token_expiry,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Token lifetime in seconds
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-for-unit-tests".to_string(),
            token_expiry: 3600,
        })
    }

    #[test]
    fn test_token_round_trip() {
        let service = test_service();
        let id = Uuid::new_v4();

        let token = service
            .generate_token(id, Role::Vendor, "vendor@example.com")
            .expect("token generation failed");
        let claims = service.validate_token(&token).expect("validation failed");

        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Vendor);
        assert_eq!(claims.email, "vendor@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = test_service();
        let other = JwtService::new(JwtConfig {
            secret: "a-different-secret".to_string(),
            token_expiry: 3600,
        });

        let token = other
            .generate_token(Uuid::new_v4(), Role::SuperAdmin, "admin@example.com")
            .expect("token generation failed");

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).expect("serialize"),
            "\"superadmin\""
        );
        assert_eq!(Role::Vendor.to_string(), "vendor");
    }
}
