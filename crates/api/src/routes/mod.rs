pub mod adoption;
pub mod auth;
pub mod cats;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /register                                 register (public)
/// /login                                    login (public)
/// /refresh                                  refresh (public)
/// /logout                                   logout (requires auth)
/// /me                                       current user (requires auth)
/// /password-reset/request                   issue reset token (public)
/// /password-reset/confirm                   redeem reset token (public)
///
/// /cats                                     list/search (public), create (admin)
/// /cats/recognize                           match a photo (public, POST)
/// /cats/{id}                                get (public), update, delete (admin)
/// /cats/{id}/images                         list (public), upload (admin)
/// /cats/{id}/adopt                          file adoption request (requires auth)
///
/// /adoptions                                caller's requests (requires auth)
/// /adoptions/{id}                           cancel (requires auth, DELETE)
///
/// /admin/adoptions                          all requests (admin only)
/// /admin/adoptions/{id}                     approve / reject (admin only, PUT)
/// ```
///
/// `max_upload_bytes` bounds the body of the image-carrying routes.
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/cats", cats::router(max_upload_bytes))
        .merge(adoption::router())
        .nest("/admin", adoption::admin_router())
}
