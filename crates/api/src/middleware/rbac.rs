//! Admin-only extractor for catalog management and adoption decisions.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use catalist_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A signed-in administrator. Other signed-in users get 403.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Administrator access required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
