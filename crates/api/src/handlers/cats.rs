//! Handlers for the cat catalog and its reference images.

use std::path::PathBuf;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use catalist_core::cat::{validate_cat_name, validate_description, CatStatus};
use catalist_core::error::CoreError;
use catalist_core::recognition::signature::embedding_to_blob;
use catalist_core::recognition::Signature;
use catalist_core::search::{clamp_limit, clamp_offset, rank};
use catalist_core::types::DbId;
use catalist_db::models::cat::{Cat, CreateCat, UpdateCat};
use catalist_db::models::cat_image::{CatImage, CreateCatImage};
use catalist_db::repositories::{CatImageRepo, CatRepo};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::ApiQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field names accepted as reference images.
const IMAGE_FIELDS: &[&str] = &["image", "images", "file"];

/// Query parameters for `GET /api/cats`.
#[derive(Debug, Default, Deserialize)]
pub struct ListCatsParams {
    /// Fuzzy search text.
    pub q: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /api/cats
///
/// Without `q`, cats are listed newest first. With `q`, the whole (status
/// filtered) catalog is ranked in memory and then paginated.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListCatsParams>,
) -> AppResult<Json<DataResponse<Vec<Cat>>>> {
    let status = parse_status_filter(params.status.as_deref())?;
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    let cats = if query.is_empty() {
        CatRepo::list_page(&state.pool, status, limit, offset).await?
    } else {
        let all = CatRepo::list_all(&state.pool, status).await?;
        rank(all, query, |cat| cat.id)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect()
    };

    Ok(Json(DataResponse { data: cats }))
}

/// GET /api/cats/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Cat>>> {
    let cat = find_cat(&state, id).await?;
    Ok(Json(DataResponse { data: cat }))
}

/// POST /api/cats
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateCat>,
) -> AppResult<(StatusCode, Json<DataResponse<Cat>>)> {
    validate_cat_name(&input.name)?;
    validate_description(input.description.as_deref())?;
    input.status = normalize_status(input.status.as_deref())?;

    let cat = CatRepo::create(&state.pool, &input).await?;
    tracing::info!(cat_id = cat.id, admin_id = admin.user_id, "Cat created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: cat })))
}

/// PUT /api/cats/{id}
///
/// Partial update: absent fields are left unchanged.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateCat>,
) -> AppResult<Json<DataResponse<Cat>>> {
    if let Some(name) = &input.name {
        validate_cat_name(name)?;
    }
    validate_description(input.description.as_deref())?;
    input.status = normalize_status(input.status.as_deref())?;

    let cat = CatRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Cat", id }))?;
    tracing::info!(cat_id = id, admin_id = admin.user_id, "Cat updated");

    Ok(Json(DataResponse { data: cat }))
}

/// DELETE /api/cats/{id}
///
/// Reference images and adoption requests are removed with the cat.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CatRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Cat", id }));
    }
    tracing::info!(cat_id = id, admin_id = admin.user_id, "Cat deleted");

    let dir = state.config.upload_dir.join(cat_upload_dir(id));
    if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %e, path = %dir.display(), "Failed to remove cat uploads");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reference images
// ---------------------------------------------------------------------------

/// GET /api/cats/{id}/images
pub async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CatImage>>>> {
    find_cat(&state, id).await?;
    let images = CatImageRepo::list_for_cat(&state.pool, id).await?;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/cats/{id}/images
///
/// Every image field is decoded and signed before anything is written, so
/// one bad file rejects the whole upload.
pub async fn upload_images(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<CatImage>>>)> {
    let cat = find_cat(&state, id).await?;

    let mut uploads: Vec<Vec<u8>> = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if !IMAGE_FIELDS.contains(&name.as_str()) {
            continue;
        }
        let data = field.bytes().await?;
        if !data.is_empty() {
            uploads.push(data.to_vec());
        }
    }

    if uploads.is_empty() {
        return Err(AppError::BadRequest(
            "Missing required 'image' field".into(),
        ));
    }

    let recognizer = state.recognizer.clone();
    let signed: Vec<(Vec<u8>, Signature)> = tokio::task::spawn_blocking(move || {
        uploads
            .into_iter()
            .map(|bytes| {
                let signature = recognizer.compute_signature(&bytes)?;
                Ok((bytes, signature))
            })
            .collect::<Result<Vec<_>, CoreError>>()
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Signature task failed: {e}")))??;

    let relative_dir = cat_upload_dir(id);
    let dir = state.config.upload_dir.join(&relative_dir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Cannot create upload directory: {e}")))?;

    let mut written: Vec<PathBuf> = Vec::with_capacity(signed.len());
    let mut inputs = Vec::with_capacity(signed.len());
    for (bytes, signature) in signed {
        let file_name = format!("{}.{}", Uuid::new_v4().simple(), image_extension(&bytes));
        let path = dir.join(&file_name);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            remove_files(&written).await;
            return Err(AppError::InternalError(format!("Cannot store upload: {e}")));
        }
        written.push(path);
        inputs.push(CreateCatImage {
            file_path: format!("{relative_dir}/{file_name}"),
            hash_hex: signature.hash_hex,
            hash_bits: signature.bits.len() as i64,
            embedding: embedding_to_blob(&signature.embedding),
        });
    }

    // The first reference photo doubles as the listing picture.
    let cover = cat
        .image_url
        .is_none()
        .then(|| format!("/uploads/{}", inputs[0].file_path));

    let created = match CatImageRepo::create_all(&state.pool, id, &inputs, cover.as_deref()).await
    {
        Ok(created) => created,
        Err(e) => {
            remove_files(&written).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        cat_id = id,
        admin_id = admin.user_id,
        count = created.len(),
        "Reference images stored"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Best-effort cleanup of files written by a failed upload.
async fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Cannot remove orphaned upload");
        }
    }
}

pub(crate) async fn find_cat(state: &AppState, id: DbId) -> AppResult<Cat> {
    CatRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Cat", id }))
}

fn parse_status_filter(status: Option<&str>) -> AppResult<Option<CatStatus>> {
    status
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .map(|s| CatStatus::parse(&s))
        .transpose()
        .map_err(AppError::from)
}

/// Validate a client-supplied status and return its canonical spelling.
fn normalize_status(status: Option<&str>) -> AppResult<Option<String>> {
    Ok(parse_status_filter(status)?.map(|s| s.as_str().to_string()))
}

/// Upload directory of one cat, relative to `UPLOAD_DIR`.
fn cat_upload_dir(id: DbId) -> String {
    format!("cats/{id}")
}

fn image_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("bin")
}
