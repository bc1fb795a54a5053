use std::sync::Arc;

use marquee_db::repositories::MovieRepo;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Movie repository (owns the shared store handle).
    pub movies: MovieRepo,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
