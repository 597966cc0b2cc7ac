//! Repository for the `password_resets` table.

use catalist_core::types::{DbId, Timestamp};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::password_reset::PasswordReset;

const COLUMNS: &str = "id, user_id, token_hash, expires_at, used_at, created_at";

pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Store the digest of a freshly issued reset token.
    pub async fn create(
        pool: &SqlitePool,
        user_id: DbId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<PasswordReset, sqlx::Error> {
        let query = format!(
            "INSERT INTO password_resets (user_id, token_hash, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Look up a reset by token digest, regardless of state.
    pub async fn find_by_token_hash(
        pool: &SqlitePool,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM password_resets WHERE token_hash = ?1");
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Mark a reset as used. Returns `false` if it was already used.
    pub async fn mark_used(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE password_resets SET used_at = ?2 WHERE id = ?1 AND used_at IS NULL",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
