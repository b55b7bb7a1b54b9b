//! Repositories for database operations
//!
//! Each repository is a `Clone` struct holding the shared `PgPool`.
//! Queries are runtime-checked; rows are mapped by column name.

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

pub mod admin;
pub mod approval_token;
pub mod banner;
pub mod category;
pub mod customer;
pub mod otp;
pub mod pending_vendor;
pub mod product;
pub mod vendor;

/// Hash a password with a fresh salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored hash
pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;
    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("Str0ng!pass").expect("hash failed");
        assert!(verify_password(&hash, "Str0ng!pass").expect("verify failed"));
        assert!(!verify_password(&hash, "wrong-password").expect("verify failed"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("Str0ng!pass").expect("hash failed");
        let b = hash_password("Str0ng!pass").expect("hash failed");
        assert_ne!(a, b);
    }
}
