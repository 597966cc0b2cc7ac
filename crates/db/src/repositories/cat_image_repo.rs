//! Repository for the `cat_images` table.

use catalist_core::types::DbId;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::cat_image::{CatImage, CreateCatImage};

const COLUMNS: &str = "id, cat_id, file_path, hash_hex, hash_bits, embedding, created_at";

pub struct CatImageRepo;

impl CatImageRepo {
    /// Store several reference images of one cat in a single transaction.
    ///
    /// When `cover_url` is given it becomes the cat's `image_url`, but only
    /// if the cat has none yet. Nothing is stored if any insert fails.
    pub async fn create_all(
        pool: &SqlitePool,
        cat_id: DbId,
        inputs: &[CreateCatImage],
        cover_url: Option<&str>,
    ) -> Result<Vec<CatImage>, sqlx::Error> {
        let query = format!(
            "INSERT INTO cat_images (cat_id, file_path, hash_hex, hash_bits, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {COLUMNS}"
        );
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let image = sqlx::query_as::<_, CatImage>(&query)
                .bind(cat_id)
                .bind(&input.file_path)
                .bind(&input.hash_hex)
                .bind(input.hash_bits)
                .bind(&input.embedding)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;
            created.push(image);
        }

        if let Some(url) = cover_url {
            sqlx::query(
                "UPDATE cats SET image_url = ?2, updated_at = ?3
                 WHERE id = ?1 AND image_url IS NULL",
            )
            .bind(cat_id)
            .bind(url)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Reference images of one cat, oldest first.
    pub async fn list_for_cat(
        pool: &SqlitePool,
        cat_id: DbId,
    ) -> Result<Vec<CatImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cat_images WHERE cat_id = ?1 ORDER BY id");
        sqlx::query_as::<_, CatImage>(&query)
            .bind(cat_id)
            .fetch_all(pool)
            .await
    }

    /// Every stored reference image, for matching.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<CatImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cat_images ORDER BY id");
        sqlx::query_as::<_, CatImage>(&query).fetch_all(pool).await
    }
}
