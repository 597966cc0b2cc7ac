//! Static website and uploaded image serving.
//!
//! Any path not claimed by the API is looked up under the static directory.
//! Misses get the site's `404.html` (or a minimal page) with status 404.

use std::path::Path;

use axum::handler::HandlerWithoutStateExt;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Body used when the site has no `404.html`.
pub const FALLBACK_NOT_FOUND_BODY: &str = "<h1>404 Not Found</h1>";

/// Name of the custom not-found page inside the static directory.
const NOT_FOUND_PAGE: &str = "404.html";

/// `/uploads` plus the static site as the router fallback. Misses in either
/// get the site's 404 page.
pub fn router(static_dir: &Path, upload_dir: &Path) -> Router<AppState> {
    let site_root = static_dir.to_path_buf();
    let not_found = move || {
        let site_root = site_root.clone();
        async move { not_found_page(&site_root).await }
    };

    let uploads = ServeDir::new(upload_dir).not_found_service(not_found.clone().into_service());
    let site = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .nest_service("/uploads", uploads)
        .fallback_service(site)
}

/// The 404 response for `static_dir`.
pub async fn not_found_page(static_dir: &Path) -> Response {
    match tokio::fs::read(static_dir.join(NOT_FOUND_PAGE)).await {
        Ok(body) => (
            StatusCode::NOT_FOUND,
            [(CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, Html(FALLBACK_NOT_FOUND_BODY)).into_response(),
    }
}
