use catalist_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `password_resets` table. Only the token digest is stored.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl PasswordReset {
    /// A token can be redeemed once, before it expires.
    pub fn is_redeemable(&self, now: Timestamp) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}
