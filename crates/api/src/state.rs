use std::sync::Arc;

use catalist_core::recognition::CatRecognizer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: catalist_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing domain events.
    pub event_bus: Arc<catalist_events::EventBus>,
    /// Signature computation for recognition and reference uploads.
    pub recognizer: CatRecognizer,
}
