#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use marquee_api::config::{ServerConfig, StoreBackend};
use marquee_api::router::build_app_router;
use marquee_api::state::AppState;
use marquee_db::repositories::MovieRepo;
use marquee_db::store::{MemoryMovieStore, MovieStore};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store_timeout_secs: 5,
        store_backend: StoreBackend::Memory,
        db_max_connections: 1,
    }
}

/// Build the full application router over `store`.
pub fn build_app_with(store: Arc<dyn MovieStore>, store_timeout: Duration) -> Router {
    let config = test_config();
    let state = AppState {
        movies: MovieRepo::with_timeout(store, store_timeout),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Build the full application router backed by a fresh in-memory store.
///
/// The router is `Clone`, so one app can serve several requests in a test.
pub fn build_test_app() -> Router {
    build_app_with(Arc::new(MemoryMovieStore::new()), Duration::from_secs(5))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: &Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
