pub mod health;
pub mod movie;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /movies                  list, create
/// /movies/{id}             get, replace, patch, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/movies", movie::router())
}
