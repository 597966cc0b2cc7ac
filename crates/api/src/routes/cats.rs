//! Route definitions for the `/cats` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{adoption, cats, recognition};
use crate::state::AppState;

/// Routes mounted at `/cats`.
///
/// ```text
/// GET, POST          /                -> list, create
/// POST               /recognize       -> recognize
/// GET, PUT, DELETE   /{id}            -> get_by_id, update, delete
/// GET, POST          /{id}/images     -> list_images, upload_images
/// GET                /{id}/signature  -> cat_signature
/// POST               /{id}/adopt      -> adopt
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(cats::list).post(cats::create))
        .route(
            "/recognize",
            post(recognition::recognize).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/{id}",
            get(cats::get_by_id).put(cats::update).delete(cats::delete),
        )
        .route(
            "/{id}/images",
            get(cats::list_images)
                .post(cats::upload_images)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/{id}/signature", get(recognition::cat_signature))
        .route("/{id}/adopt", post(adoption::adopt))
}
