//! Cat catalog status values and field validation.
//!
//! Statuses are stored as lowercase text in the `cats.status` column.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length accepted for a cat's display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length accepted for free-text description fields.
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;

/// Availability of a cat in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatStatus {
    /// Open for adoption requests.
    Available,
    /// Temporarily held back by staff (medical care, foster, ...).
    Reserved,
    /// Adoption approved; no further requests accepted.
    Adopted,
}

impl CatStatus {
    pub const ALL: [CatStatus; 3] = [Self::Available, Self::Reserved, Self::Adopted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Adopted => "adopted",
        }
    }

    /// Parse a stored or user-supplied status name.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown cat status '{value}'. Expected one of: available, reserved, adopted"
                ))
            })
    }

    /// Whether new adoption requests may be filed for a cat in this status.
    pub fn accepts_requests(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Validate a cat name: non-empty after trimming and within the length cap.
pub fn validate_cat_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Cat name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Cat name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional description field.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(text) = description {
        if text.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(CoreError::Validation(format!(
                "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_known_statuses() {
        for status in CatStatus::ALL {
            assert_eq!(CatStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn parse_unknown_status_is_validation_error() {
        assert_matches!(CatStatus::parse("lost"), Err(CoreError::Validation(_)));
        assert_matches!(CatStatus::parse("Available"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn only_available_cats_accept_requests() {
        assert!(CatStatus::Available.accepts_requests());
        assert!(!CatStatus::Reserved.accepts_requests());
        assert!(!CatStatus::Adopted.accepts_requests());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&CatStatus::Reserved).unwrap();
        assert_eq!(json, "\"reserved\"");
        let parsed: CatStatus = serde_json::from_str("\"adopted\"").unwrap();
        assert_eq!(parsed, CatStatus::Adopted);
    }

    #[test]
    fn cat_name_rules() {
        assert!(validate_cat_name("Mochi").is_ok());
        assert!(validate_cat_name("   ").is_err());
        assert!(validate_cat_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn description_cap() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("friendly tabby")).is_ok());
        assert!(validate_description(Some(&"a".repeat(MAX_DESCRIPTION_LENGTH + 1))).is_err());
    }
}
