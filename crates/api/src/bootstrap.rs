//! Startup provisioning of the first administrator account.

use catalist_core::error::CoreError;
use catalist_core::validation::{normalize_email, validate_email};
use catalist_db::models::user::{CreateUser, User};
use catalist_db::repositories::UserRepo;
use catalist_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};

/// Display name given to the bootstrapped account.
pub const ADMIN_DISPLAY_NAME: &str = "Administrator";

/// Create an admin account for `email` unless one already exists.
///
/// Returns the new user, or `None` when the email is already registered
/// (whatever its role).
pub async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> AppResult<Option<User>> {
    let email = normalize_email(email);
    validate_email(&email)?;

    if UserRepo::find_by_email(pool, &email).await?.is_some() {
        tracing::debug!(%email, "Bootstrap admin already present");
        return Ok(None);
    }

    validate_password_strength(password, MIN_PASSWORD_LENGTH).map_err(CoreError::Validation)?;
    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email,
            name: ADMIN_DISPLAY_NAME.to_string(),
            phone: None,
            password_hash,
            is_admin: true,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
    Ok(Some(user))
}
