//! Camera capture recognition: match a photo against stored reference images.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use catalist_core::error::CoreError;
use catalist_core::recognition::signature::{aggregate_hashes, summarize_embeddings};
use catalist_core::recognition::{match_against, RecognitionResult, Reference};
use catalist_core::types::DbId;
use catalist_db::models::cat::Cat;
use catalist_db::repositories::{CatImageRepo, CatRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::query::ApiQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `POST /api/cats/recognize`.
#[derive(Debug, Default, Deserialize)]
pub struct RecognizeParams {
    /// Number of matches to return (capped at 20).
    pub limit: Option<usize>,
}

/// JSON form of the request, as sent by the camera capture page.
#[derive(Debug, Deserialize)]
pub struct RecognizeJson {
    /// A `data:image/...;base64,` URL or bare base64.
    pub image: String,
}

/// One candidate cat.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionMatch {
    pub cat_id: DbId,
    pub cat_name: String,
    pub similarity: f32,
    pub hamming_distance: u32,
    pub reference_image_id: Option<DbId>,
    pub reference_hash_length: usize,
    pub matched: bool,
    pub cat: Option<Cat>,
}

#[derive(Debug, Serialize)]
pub struct RecognizeResponse {
    pub matches: Vec<RecognitionMatch>,
    /// The top match, when it clears the similarity threshold.
    pub best_match: Option<RecognitionMatch>,
    pub reference_count: usize,
}

/// POST /api/cats/recognize
///
/// Accepts a multipart form with an `image` field or a JSON `{ "image": ... }`
/// body.
pub async fn recognize(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RecognizeParams>,
    request: Request,
) -> AppResult<Json<DataResponse<RecognizeResponse>>> {
    let image = read_image(&state, request).await?;

    let references: Vec<Reference> = CatImageRepo::list_all(&state.pool)
        .await?
        .iter()
        .filter_map(|row| match row.to_reference() {
            Ok(reference) => Some(reference),
            Err(e) => {
                tracing::warn!(image_id = row.id, error = %e, "Skipping unreadable reference");
                None
            }
        })
        .collect();
    let reference_count = references.len();

    let recognizer = state.recognizer.clone();
    let options = state.config.recognition.match_options(params.limit);
    let results: Vec<RecognitionResult> = tokio::task::spawn_blocking(move || {
        let signature = recognizer.compute_signature(&image)?;
        Ok::<_, CoreError>(match_against(
            &signature.bits,
            &signature.embedding,
            &references,
            &options,
        ))
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Recognition task failed: {e}")))??;

    let mut matches = Vec::with_capacity(results.len());
    for result in results {
        let cat = CatRepo::find_by_id(&state.pool, result.cat_id).await?;
        matches.push(RecognitionMatch {
            cat_id: result.cat_id,
            cat_name: cat
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("Cat #{}", result.cat_id)),
            similarity: result.similarity,
            hamming_distance: result.hamming_distance,
            reference_image_id: result.reference_image_id,
            reference_hash_length: result.reference_hash_length,
            matched: result.matched,
            cat,
        });
    }

    let best_match = matches.first().filter(|m| m.matched).cloned();

    tracing::info!(
        reference_count,
        returned = matches.len(),
        best_cat_id = best_match.as_ref().map(|m| m.cat_id),
        "Recognition completed"
    );

    Ok(Json(DataResponse {
        data: RecognizeResponse {
            matches,
            best_match,
            reference_count,
        },
    }))
}

/// Consensus signature over all reference photos of one cat.
#[derive(Debug, Serialize)]
pub struct CatSignature {
    pub cat_id: DbId,
    pub reference_count: usize,
    /// Majority-vote hash; `None` without references.
    pub hash_hex: Option<String>,
    pub hash_bits: usize,
    /// Unit-length centroid of the reference embeddings.
    pub embedding: Option<Vec<f32>>,
}

/// GET /api/cats/{id}/signature
pub async fn cat_signature(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CatSignature>>> {
    crate::handlers::cats::find_cat(&state, id).await?;

    let references = CatImageRepo::list_for_cat(&state.pool, id)
        .await?
        .iter()
        .map(|row| row.to_reference())
        .collect::<Result<Vec<Reference>, CoreError>>()?;

    let hashes: Vec<Vec<bool>> = references.iter().map(|r| r.bits.clone()).collect();
    let embeddings: Vec<Vec<f32>> = references.into_iter().map(|r| r.embedding).collect();

    Ok(Json(DataResponse {
        data: CatSignature {
            cat_id: id,
            reference_count: hashes.len(),
            hash_hex: aggregate_hashes(&hashes),
            hash_bits: hashes.iter().map(Vec::len).max().unwrap_or(0),
            embedding: summarize_embeddings(&embeddings),
        },
    }))
}

/// Pull the raw image bytes out of either accepted request shape.
async fn read_image(state: &AppState, request: Request) -> AppResult<Vec<u8>> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let bytes = if is_multipart {
        let mut multipart = Multipart::from_request(request, state).await?;
        let mut image = None;
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some("image") {
                let data = field.bytes().await?;
                image = Some(data.to_vec());
                break;
            }
        }
        image.unwrap_or_default()
    } else {
        let Json(body) = Json::<RecognizeJson>::from_request(request, state).await?;
        decode_image_payload(&body.image)?
    };

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Missing required 'image' field".into()));
    }
    Ok(bytes)
}

/// Decode a `data:` URL or bare base64 string.
pub fn decode_image_payload(payload: &str) -> AppResult<Vec<u8>> {
    let payload = payload.trim();
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| AppError::BadRequest("Malformed data URL".into()))?;
            if !meta.ends_with(";base64") {
                return Err(AppError::BadRequest(
                    "Data URL must be base64 encoded".into(),
                ));
            }
            data
        }
        None => payload,
    };

    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|_| AppError::BadRequest("Image payload is not valid base64".into()))
}
