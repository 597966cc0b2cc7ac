//! Shared query parameter types for API handlers.

use axum::extract::{FromRequestParts, Query};
use serde::Deserialize;

use crate::error::AppError;

/// `Query` whose rejection uses the JSON error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Optional `?status=` filter for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

impl StatusFilter {
    /// The filter value, treating an empty string as absent.
    pub fn value(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_status_is_absent() {
        let filter = StatusFilter {
            status: Some("  ".into()),
        };
        assert_eq!(filter.value(), None);
        assert_eq!(StatusFilter::default().value(), None);

        let filter = StatusFilter {
            status: Some(" pending ".into()),
        };
        assert_eq!(filter.value(), Some("pending"));
    }
}
