//! Repository for the `adoption_requests` table.

use catalist_core::adoption::AdoptionStatus;
use catalist_core::cat::CatStatus;
use catalist_core::types::DbId;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::adoption::{AdoptionRequest, AdoptionRequestDetail, CreateAdoptionRequest};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, cat_id, user_id, message, contact_phone, status, admin_note, \
                        decided_by, decided_at, created_at, updated_at";

/// Joined projection used by listings.
const DETAIL_SELECT: &str = "SELECT r.id, r.cat_id, c.name AS cat_name, c.status AS cat_status,
                                    r.user_id, u.name AS applicant_name, u.email AS applicant_email,
                                    r.message, r.contact_phone, r.status, r.admin_note,
                                    r.decided_by, r.decided_at, r.created_at, r.updated_at
                             FROM adoption_requests r
                             JOIN cats c ON c.id = r.cat_id
                             JOIN users u ON u.id = r.user_id";

/// Note attached to competing requests when another applicant is approved.
pub const SUPERSEDED_NOTE: &str = "Another application for this cat was approved";

pub struct AdoptionRepo;

impl AdoptionRepo {
    /// File a new pending request.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateAdoptionRequest,
    ) -> Result<AdoptionRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO adoption_requests (cat_id, user_id, message, contact_phone, status,
                                            created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdoptionRequest>(&query)
            .bind(input.cat_id)
            .bind(input.user_id)
            .bind(&input.message)
            .bind(&input.contact_phone)
            .bind(AdoptionStatus::Pending.as_str())
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<AdoptionRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM adoption_requests WHERE id = ?1");
        sqlx::query_as::<_, AdoptionRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<AdoptionRequestDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE r.id = ?1");
        sqlx::query_as::<_, AdoptionRequestDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user already has an open request for the cat.
    pub async fn has_pending(
        pool: &SqlitePool,
        cat_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM adoption_requests
                WHERE cat_id = ?1 AND user_id = ?2 AND status = ?3
             )",
        )
        .bind(cat_id)
        .bind(user_id)
        .bind(AdoptionStatus::Pending.as_str())
        .fetch_one(pool)
        .await
    }

    /// A user's own requests, newest first.
    pub async fn list_for_user(
        pool: &SqlitePool,
        user_id: DbId,
    ) -> Result<Vec<AdoptionRequestDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE r.user_id = ?1 ORDER BY r.id DESC");
        sqlx::query_as::<_, AdoptionRequestDetail>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All requests (optionally of one status), newest first.
    pub async fn list(
        pool: &SqlitePool,
        status: Option<AdoptionStatus>,
    ) -> Result<Vec<AdoptionRequestDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE (?1 IS NULL OR r.status = ?1) ORDER BY r.id DESC");
        sqlx::query_as::<_, AdoptionRequestDetail>(&query)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Move a pending request to `cancelled`. `None` when it was not pending.
    pub async fn cancel(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<AdoptionRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE adoption_requests SET status = ?2, updated_at = ?3
             WHERE id = ?1 AND status = ?4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdoptionRequest>(&query)
            .bind(id)
            .bind(AdoptionStatus::Cancelled.as_str())
            .bind(Utc::now())
            .bind(AdoptionStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Reject a pending request. `None` when it was not pending.
    pub async fn reject(
        pool: &SqlitePool,
        id: DbId,
        admin_id: DbId,
        note: Option<&str>,
    ) -> Result<Option<AdoptionRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE adoption_requests
             SET status = ?2, admin_note = ?3, decided_by = ?4, decided_at = ?5, updated_at = ?5
             WHERE id = ?1 AND status = ?6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdoptionRequest>(&query)
            .bind(id)
            .bind(AdoptionStatus::Rejected.as_str())
            .bind(note)
            .bind(admin_id)
            .bind(Utc::now())
            .bind(AdoptionStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Approve a pending request in one transaction.
    ///
    /// The cat becomes `adopted` and every other pending request for the
    /// same cat is rejected with [`SUPERSEDED_NOTE`]. Returns the approved
    /// request plus the ids of the superseded ones, or `None` when the
    /// request was not pending (nothing is changed).
    pub async fn approve(
        pool: &SqlitePool,
        id: DbId,
        admin_id: DbId,
        note: Option<&str>,
    ) -> Result<Option<(AdoptionRequest, Vec<DbId>)>, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE adoption_requests
             SET status = ?2, admin_note = ?3, decided_by = ?4, decided_at = ?5, updated_at = ?5
             WHERE id = ?1 AND status = ?6
             RETURNING {COLUMNS}"
        );
        let approved = sqlx::query_as::<_, AdoptionRequest>(&query)
            .bind(id)
            .bind(AdoptionStatus::Approved.as_str())
            .bind(note)
            .bind(admin_id)
            .bind(now)
            .bind(AdoptionStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(approved) = approved else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE cats SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(approved.cat_id)
            .bind(CatStatus::Adopted.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let superseded: Vec<DbId> = sqlx::query_scalar(
            "UPDATE adoption_requests
             SET status = ?2, admin_note = ?3, decided_by = ?4, decided_at = ?5, updated_at = ?5
             WHERE cat_id = ?1 AND status = ?6
             RETURNING id",
        )
        .bind(approved.cat_id)
        .bind(AdoptionStatus::Rejected.as_str())
        .bind(SUPERSEDED_NOTE)
        .bind(admin_id)
        .bind(now)
        .bind(AdoptionStatus::Pending.as_str())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            request_id = approved.id,
            cat_id = approved.cat_id,
            superseded = superseded.len(),
            "Adoption approved"
        );
        Ok(Some((approved, superseded)))
    }
}
