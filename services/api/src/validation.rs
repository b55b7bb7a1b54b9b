//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Please provide a valid email address".to_string());
    }

    Ok(())
}

/// Validate phone number (optional field; empty passes)
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Ok(());
    }

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^\+?[1-9]\d{0,15}$").expect("Failed to compile phone regex")
    });

    let stripped: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if !regex.is_match(&stripped) {
        return Err("Please provide a valid phone number".to_string());
    }

    Ok(())
}

/// Validate password against the strength policy:
/// at least 8 characters with upper, lower, digit, and special character
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in password.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else if !c.is_alphanumeric() {
            has_special = true;
        }
    }

    if !has_upper {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }

    if !has_special {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

/// Validate company name length bounds
pub fn validate_company_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Company name is required".to_string());
    }
    if trimmed.len() < 2 {
        return Err("Company name must be at least 2 characters long".to_string());
    }
    if trimmed.len() > 100 {
        return Err("Company name cannot exceed 100 characters".to_string());
    }
    Ok(())
}

/// Validate the 6-digit OTP format
pub fn validate_otp_format(otp: &str) -> Result<(), String> {
    static OTP_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        OTP_REGEX.get_or_init(|| Regex::new(r"^\d{6}$").expect("Failed to compile OTP regex"));

    if !regex.is_match(otp.trim()) {
        return Err("Invalid OTP format. Please enter 6 digits.".to_string());
    }

    Ok(())
}

/// Build a URL slug from a product title.
///
/// Lowercases, keeps alphanumerics, collapses everything else to single
/// hyphens, and appends a base36 timestamp so concurrent identical titles
/// still get unique slugs.
pub fn slugify(title: &str, now_millis: u64) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug.push_str("product");
    }

    format!("{}-{}", slug, to_base36(now_millis))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("vendor@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("").is_ok());
        assert!(validate_phone("+4915112345678").is_ok());
        assert!(validate_phone("91 12345 67890").is_ok());
        assert!(validate_phone("0123").is_err());
        assert!(validate_phone("abc").is_err());
    }

    #[test]
    fn test_validate_password_policy() {
        assert!(validate_password("Str0ng!pass").is_ok());
        assert!(validate_password("short1!A").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("toolowercase1!").is_err());
        assert!(validate_password("NOUPPERCASE1!").is_err());
        assert!(validate_password("NoDigits!!").is_err());
        assert!(validate_password("NoSpecial11").is_err());
        assert!(validate_password("Sh0rt!").is_err());
    }

    #[test]
    fn test_validate_otp_format() {
        assert!(validate_otp_format("123456").is_ok());
        assert!(validate_otp_format(" 123456 ").is_ok());
        assert!(validate_otp_format("12345").is_err());
        assert!(validate_otp_format("1234567").is_err());
        assert!(validate_otp_format("12a456").is_err());
    }

    #[test]
    fn test_slugify() {
        let slug = slugify("Handmade Oak Table!", 1_700_000_000_000);
        assert!(slug.starts_with("handmade-oak-table-"));
        assert!(!slug.contains("--"));
        assert!(!slug.contains('!'));

        // Empty titles still produce something usable
        let fallback = slugify("!!!", 42);
        assert!(fallback.starts_with("product-"));
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
