//! Handlers for the `/movies` resource.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::Json;
use marquee_core::error::CoreError;
use marquee_core::filters::validate_filters;
use marquee_core::movie::{validate_movie, Movie, MovieInput, MoviePatch};
use marquee_core::validator::Validator;
use marquee_db::error::RepoError;

use crate::error::AppResult;
use crate::query::ListMoviesParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Validate `input`, turning any failures into a 422.
fn ensure_valid(input: &MovieInput) -> Result<(), CoreError> {
    let mut v = Validator::new();
    validate_movie(&mut v, input);
    v.finish()
}

/// POST /api/v1/movies
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<DataResponse<Movie>>)> {
    let Json(input) = payload?;
    ensure_valid(&input)?;

    let id = match state.movies.insert(&input).await {
        Ok(id) => id,
        Err(RepoError::Duplicate { .. }) => {
            let mut v = Validator::new();
            v.add_error("id", "a movie with this identifier already exists");
            return Err(CoreError::Validation(v.into_errors()).into());
        }
        Err(err) => return Err(err.into()),
    };
    let movie = state.movies.get(&id.to_string()).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/movies/{id}")) {
        headers.insert(LOCATION, location);
    }

    tracing::info!(%id, title = %movie.title, "Movie created");
    Ok((StatusCode::CREATED, headers, Json(DataResponse { data: movie })))
}

/// GET /api/v1/movies
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListMoviesParams>, QueryRejection>,
) -> AppResult<Json<PageResponse<Movie>>> {
    let Query(params) = params?;
    let filters = params.filters();

    let mut v = Validator::new();
    validate_filters(&mut v, &filters);
    v.finish()?;

    let (movies, metadata) = state
        .movies
        .get_all(params.title(), &params.genres(), &filters)
        .await?;
    Ok(Json(PageResponse {
        data: movies,
        metadata,
    }))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Movie>>> {
    let movie = state.movies.get(&id).await?;
    Ok(Json(DataResponse { data: movie }))
}

/// PUT /api/v1/movies/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> AppResult<Json<DataResponse<Movie>>> {
    // Resolve the target first so a missing movie is a 404, not a silent no-op.
    state.movies.get(&id).await?;

    let Json(input) = payload?;
    ensure_valid(&input)?;

    replace_and_fetch(&state, &input, &id).await
}

/// PATCH /api/v1/movies/{id}
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MoviePatch>, JsonRejection>,
) -> AppResult<Json<DataResponse<Movie>>> {
    let existing = state.movies.get(&id).await?;

    let Json(patch) = payload?;
    let mut input = existing.to_input();
    patch.apply(&mut input);
    ensure_valid(&input)?;

    replace_and_fetch(&state, &input, &id).await
}

/// DELETE /api/v1/movies/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    state.movies.delete(&id).await?;
    tracing::info!(%id, "Movie deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn replace_and_fetch(
    state: &AppState,
    input: &MovieInput,
    id: &str,
) -> AppResult<Json<DataResponse<Movie>>> {
    state.movies.update(input, id).await?;
    let movie = state.movies.get(id).await?;
    Ok(Json(DataResponse { data: movie }))
}
