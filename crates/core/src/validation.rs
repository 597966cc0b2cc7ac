//! Account field validation shared by registration and password reset.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum length of a display name.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 80;

/// Canonical form of an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a (normalized) email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.is_empty() {
        return Err(CoreError::Validation("Email must not be empty".into()));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// Validate a display name: non-empty after trimming, bounded length.
pub fn validate_display_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional phone number: digits, spaces, `+`, `-` and parentheses.
pub fn validate_phone(phone: Option<&str>) -> Result<(), CoreError> {
    let Some(phone) = phone else {
        return Ok(());
    };
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    if !allowed || !(5..=20).contains(&digits) {
        return Err(CoreError::Validation(format!(
            "'{phone}' is not a valid phone number"
        )));
    }
    Ok(())
}
