//! Route definitions for adoption requests.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::adoption;
use crate::state::AppState;

/// Applicant routes, mounted at the `/api` root.
///
/// ```text
/// GET    /adoptions        -> list_mine
/// DELETE /adoptions/{id}   -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/adoptions", get(adoption::list_mine))
        .route("/adoptions/{id}", delete(adoption::cancel))
}

/// Administrator routes, mounted at `/admin`.
///
/// ```text
/// GET /adoptions        -> list_all
/// PUT /adoptions/{id}   -> decide
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/adoptions", get(adoption::list_all))
        .route("/adoptions/{id}", put(adoption::decide))
}
