//! Route definitions for the `/movies` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::movie;
use crate::state::AppState;

/// Routes mounted at `/movies`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// PATCH  /{id}             -> patch
/// DELETE /{id}             -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(movie::list).post(movie::create))
        .route(
            "/{id}",
            get(movie::get_by_id)
                .put(movie::update)
                .patch(movie::patch)
                .delete(movie::delete),
        )
}
