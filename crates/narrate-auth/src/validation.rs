//! Input validation for account fields

use crate::error::AuthError;

/// Maximum display name length
pub const MAX_FULL_NAME_LENGTH: usize = 100;
/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 4;
/// Maximum password length
pub const MAX_PASSWORD_LENGTH: usize = 128;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Validate a display name
pub fn validate_full_name(full_name: &str) -> Result<(), AuthError> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation("Full name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_FULL_NAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "Full name exceeds maximum length of {} characters",
            MAX_FULL_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate an already normalized phone number
///
/// Accepts an optional leading `+` followed by 7 to 15 digits.
pub fn validate_phone_number(phone_number: &str) -> Result<(), AuthError> {
    let digits = phone_number.strip_prefix('+').unwrap_or(phone_number);

    if digits.is_empty() {
        return Err(AuthError::Validation("Phone number cannot be empty".to_string()));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::Validation(
            "Phone number can only contain digits and a leading '+'".to_string(),
        ));
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(AuthError::Validation(format!(
            "Phone number must have between {} and {} digits",
            MIN_PHONE_DIGITS, MAX_PHONE_DIGITS
        )));
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert!(validate_full_name("Alice").is_ok());
        assert!(validate_full_name("   ").is_err());
        assert!(validate_full_name(&"a".repeat(MAX_FULL_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_phone_number() {
        assert!(validate_phone_number("+15550001").is_ok());
        assert!(validate_phone_number("9876543210").is_ok());
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("+").is_err());
        assert!(validate_phone_number("+1555abc0001").is_err());
        assert!(validate_phone_number("123").is_err());
        assert!(validate_phone_number("+1234567890123456").is_err());
    }

    #[test]
    fn test_password() {
        assert!(validate_password("pw123").is_ok());
        assert!(validate_password("pw1").is_err());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }
}
