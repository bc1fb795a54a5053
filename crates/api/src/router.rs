//! Application router for the movie service.
//!
//! [`build_app_router`] is shared by the binary and the integration tests so
//! both exercise the same routes, fallbacks and middleware.

use std::any::Any;
use std::time::Duration;

use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::error::{AppError, INTERNAL_MESSAGE};
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the movie service [`Router`].
///
/// Unmatched paths and methods answer with the same JSON error body as the
/// handlers. Layers, outermost first:
///
/// 1. CORS (exposes `Location` and the request id to browsers)
/// 2. Request id assignment
/// 3. Request/response tracing
/// 4. Request id echoed on the response
/// 5. Whole-request timeout
/// 6. Panics turned into a JSON 500
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}

fn panic_response(_payload: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_MESSAGE, "code": "INTERNAL_ERROR" })),
    )
        .into_response()
}

/// CORS for the movie endpoints.
///
/// The API is unauthenticated, so no credentials or `Authorization` header
/// are allowed.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(&config.cors_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([LOCATION, HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(3600))
}

/// Parse configured origins, skipping any that are not valid header values.
fn allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(%origin, error = %err, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}
