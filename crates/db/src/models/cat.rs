//! Cat entity model and DTOs.

use catalist_core::search::Searchable;
use catalist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cats` table.
///
/// `status` holds a [`catalist_core::cat::CatStatus`] name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cat {
    pub id: DbId,
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub health_status: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Searchable for Cat {
    fn name_field(&self) -> &str {
        &self.name
    }

    fn other_fields(&self) -> Vec<&str> {
        [
            &self.breed,
            &self.color,
            &self.location,
            &self.description,
            &self.gender,
            &self.health_status,
        ]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .collect()
    }
}

/// DTO for creating a cat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCat {
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub health_status: Option<String>,
    pub image_url: Option<String>,
    /// Defaults to `available` when omitted.
    pub status: Option<String>,
}

/// DTO for updating a cat. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCat {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub health_status: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
}
