//! Repository for the `cats` table.

use catalist_core::cat::CatStatus;
use catalist_core::types::DbId;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::cat::{Cat, CreateCat, UpdateCat};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, gender, age, breed, color, location, description, \
                        health_status, image_url, status, created_at, updated_at";

/// Provides CRUD operations for cats.
pub struct CatRepo;

impl CatRepo {
    /// Insert a new cat, returning the created row.
    ///
    /// `input.status` must already be validated; `None` stores `available`.
    pub async fn create(pool: &SqlitePool, input: &CreateCat) -> Result<Cat, sqlx::Error> {
        let query = format!(
            "INSERT INTO cats (name, gender, age, breed, color, location, description,
                               health_status, image_url, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             RETURNING {COLUMNS}"
        );
        let status = input
            .status
            .as_deref()
            .unwrap_or(CatStatus::Available.as_str());
        sqlx::query_as::<_, Cat>(&query)
            .bind(input.name.trim())
            .bind(&input.gender)
            .bind(&input.age)
            .bind(&input.breed)
            .bind(&input.color)
            .bind(&input.location)
            .bind(&input.description)
            .bind(&input.health_status)
            .bind(&input.image_url)
            .bind(status)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find a cat by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Cat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cats WHERE id = ?1");
        sqlx::query_as::<_, Cat>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every cat (optionally of one status), newest first.
    ///
    /// Used by fuzzy search, which ranks in memory before paginating.
    pub async fn list_all(
        pool: &SqlitePool,
        status: Option<CatStatus>,
    ) -> Result<Vec<Cat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cats
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, Cat>(&query)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// List one page of cats (optionally of one status), newest first.
    pub async fn list_page(
        pool: &SqlitePool,
        status: Option<CatStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Cat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cats
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY id DESC
             LIMIT ?2 OFFSET ?3"
        );
        sqlx::query_as::<_, Cat>(&query)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a cat. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateCat,
    ) -> Result<Option<Cat>, sqlx::Error> {
        let query = format!(
            "UPDATE cats SET
                name = COALESCE(?2, name),
                gender = COALESCE(?3, gender),
                age = COALESCE(?4, age),
                breed = COALESCE(?5, breed),
                color = COALESCE(?6, color),
                location = COALESCE(?7, location),
                description = COALESCE(?8, description),
                health_status = COALESCE(?9, health_status),
                image_url = COALESCE(?10, image_url),
                status = COALESCE(?11, status),
                updated_at = ?12
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cat>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.gender)
            .bind(&input.age)
            .bind(&input.breed)
            .bind(&input.color)
            .bind(&input.location)
            .bind(&input.description)
            .bind(&input.health_status)
            .bind(&input.image_url)
            .bind(&input.status)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Delete a cat. Reference images and adoption requests cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cats WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
