//! Well-known role name constants.
//!
//! Roles are derived from the `users.is_admin` flag and embedded in JWT claims.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Map the stored admin flag to the role name carried in access tokens.
pub fn role_for(is_admin: bool) -> &'static str {
    if is_admin {
        ROLE_ADMIN
    } else {
        ROLE_USER
    }
}
