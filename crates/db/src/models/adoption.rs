//! Adoption request model and DTOs.

use catalist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `adoption_requests` table.
///
/// `status` holds an [`catalist_core::adoption::AdoptionStatus`] name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdoptionRequest {
    pub id: DbId,
    pub cat_id: DbId,
    pub user_id: DbId,
    pub message: Option<String>,
    pub contact_phone: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An adoption request joined with its cat and applicant, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdoptionRequestDetail {
    pub id: DbId,
    pub cat_id: DbId,
    pub cat_name: String,
    pub cat_status: String,
    pub user_id: DbId,
    pub applicant_name: String,
    pub applicant_email: String,
    pub message: Option<String>,
    pub contact_phone: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for filing a new request.
pub struct CreateAdoptionRequest {
    pub cat_id: DbId,
    pub user_id: DbId,
    pub message: Option<String>,
    pub contact_phone: Option<String>,
}
