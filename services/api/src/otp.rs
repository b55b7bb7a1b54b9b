//! One-time codes and approval link tokens

use rand::Rng;

/// OTP lifetime in seconds
pub const OTP_TTL_SECONDS: i64 = 120;
/// Verification attempts before the code is invalidated
pub const OTP_MAX_ATTEMPTS: i32 = 5;
/// Cooldown after burning all attempts, in seconds
pub const OTP_COOLDOWN_SECONDS: i64 = 300;
/// Approval token lifetime in days
pub const APPROVAL_TOKEN_TTL_DAYS: i64 = 10;

/// Generate a random 6-digit OTP, zero-padded
pub fn generate_otp() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

/// Generate an opaque approval token: 32 random bytes, hex encoded
pub fn generate_approval_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_approval_token_shape() {
        let token = generate_approval_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_approval_tokens_are_unique() {
        assert_ne!(generate_approval_token(), generate_approval_token());
    }
}
