//! HTTP-level integration tests for the `/movies` endpoints.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the router
//! without an actual TCP listener, over an in-memory store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
    LOCATION, ORIGIN,
};
use axum::http::{Request, StatusCode};
use common::{body_json, build_test_app, delete, get, patch_json, post_json, put_json};
use marquee_core::filters::{Sort, Window};
use marquee_core::movie::{Movie, MovieInput};
use marquee_core::search::SearchPredicate;
use marquee_core::types::MovieId;
use marquee_db::error::{RepoError, RepoResult};
use marquee_db::store::{MemoryMovieStore, MovieStore};
use serde_json::json;
use tower::ServiceExt;

fn deadpool() -> serde_json::Value {
    json!({
        "title": "Deadpool",
        "year": 2016,
        "runtime": "108 mins",
        "genres": ["action", "comedy"]
    })
}

async fn create(app: &axum::Router, body: serde_json::Value) -> String {
    let response = post_json(app, "/api/v1/movies", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_store_status() {
    let app = build_test_app();
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store_healthy"], true);
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_201_with_location() {
    let app = build_test_app();
    let response = post_json(&app, "/api/v1/movies", deadpool()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response.headers()[LOCATION].to_str().unwrap().to_string();
    let json = body_json(response).await;
    let id = json["data"]["id"].as_str().unwrap();

    assert_eq!(location, format!("/api/v1/movies/{id}"));
    assert_eq!(id.len(), 32);
    assert_eq!(json["data"]["title"], "Deadpool");
    assert_eq!(json["data"]["runtime"], "108 mins");
    assert!(json["data"].get("version").is_none());
    assert!(json["data"].get("created_at").is_none());
}

#[tokio::test]
async fn get_returns_created_movie() {
    let app = build_test_app();
    let id = create(&app, deadpool()).await;

    let response = get(&app, &format!("/api/v1/movies/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"],
        json!({
            "id": id,
            "title": "Deadpool",
            "year": 2016,
            "runtime": "108 mins",
            "genres": ["action", "comedy"]
        })
    );
}

#[tokio::test]
async fn invalid_movie_returns_422_with_field_errors() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/v1/movies",
        json!({"title": "", "year": 1500, "runtime": "-1 mins", "genres": ["a", "a"]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["title"], "must be provided");
    assert_eq!(json["error"]["year"], "must be greater than 1888");
    assert_eq!(json["error"]["runtime"], "must be a positive integer");
    assert_eq!(json["error"]["genres"], "must not contain duplicate values");
}

/// Store that reports every insert as a key collision.
#[derive(Default)]
struct CollidingStore {
    inner: MemoryMovieStore,
}

#[async_trait]
impl MovieStore for CollidingStore {
    async fn insert(&self, _movie: &Movie) -> RepoResult<()> {
        Err(RepoError::Duplicate {
            constraint: "movies_pkey".to_string(),
        })
    }

    async fn increment_version(&self, id: MovieId) -> RepoResult<()> {
        self.inner.increment_version(id).await
    }

    async fn find(&self, id: MovieId) -> RepoResult<Option<Movie>> {
        self.inner.find(id).await
    }

    async fn replace(&self, id: MovieId, input: &MovieInput) -> RepoResult<u64> {
        self.inner.replace(id, input).await
    }

    async fn remove(&self, id: MovieId) -> RepoResult<u64> {
        self.inner.remove(id).await
    }

    async fn count(&self, predicate: &SearchPredicate, window: Option<Window>) -> RepoResult<i64> {
        self.inner.count(predicate, window).await
    }

    async fn find_page(
        &self,
        predicate: &SearchPredicate,
        sort: Sort,
        window: Window,
    ) -> RepoResult<Vec<Movie>> {
        self.inner.find_page(predicate, sort, window).await
    }

    async fn ping(&self) -> RepoResult<()> {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn duplicate_id_on_create_returns_422_on_id() {
    let app = common::build_app_with(Arc::new(CollidingStore::default()), Duration::from_secs(5));

    let response = post_json(&app, "/api/v1/movies", deadpool()).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["id"],
        "a movie with this identifier already exists"
    );
}

#[tokio::test]
async fn malformed_runtime_returns_400() {
    let app = build_test_app();
    let mut body = deadpool();
    body["runtime"] = json!(108);
    let response = post_json(&app, "/api/v1/movies", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_id_returns_404() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/movies/not-an-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn put_replaces_movie() {
    let app = build_test_app();
    let id = create(&app, deadpool()).await;

    let response = put_json(
        &app,
        &format!("/api/v1/movies/{id}"),
        json!({
            "title": "Deadpool",
            "year": 2016,
            "runtime": "108 mins",
            "genres": ["action", "comedy", "sci-fi"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["genres"], json!(["action", "comedy", "sci-fi"]));
}

#[tokio::test]
async fn put_validates_before_writing() {
    let app = build_test_app();
    let id = create(&app, deadpool()).await;

    let response = put_json(&app, &format!("/api/v1/movies/{id}"), json!({"title": "Only"})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(get(&app, &format!("/api/v1/movies/{id}")).await).await;
    assert_eq!(json["data"]["title"], "Deadpool");
}

#[tokio::test]
async fn put_on_missing_movie_returns_404() {
    let app = build_test_app();
    let id = create(&app, deadpool()).await;
    delete(&app, &format!("/api/v1/movies/{id}")).await;

    let response = put_json(&app, &format!("/api/v1/movies/{id}"), deadpool()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_merges_present_fields() {
    let app = build_test_app();
    let id = create(&app, deadpool()).await;

    let response = patch_json(&app, &format!("/api/v1/movies/{id}"), json!({"year": 2018})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["year"], 2018);
    assert_eq!(json["data"]["title"], "Deadpool");
    assert_eq!(json["data"]["genres"], json!(["action", "comedy"]));
}

#[tokio::test]
async fn patch_rejects_invalid_result() {
    let app = build_test_app();
    let id = create(&app, deadpool()).await;

    let response = patch_json(&app, &format!("/api/v1/movies/{id}"), json!({"genres": []})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"]["genres"],
        "must contain at least 1 genre"
    );
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = build_test_app();
    let id = create(&app, deadpool()).await;
    let uri = format!("/api/v1/movies/{id}");

    assert_eq!(delete(&app, &uri).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&app, &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete(&app, &uri).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_filters_by_title() {
    let app = build_test_app();
    create(
        &app,
        json!({"title": "The Matrix", "year": 1999, "runtime": "136 mins", "genres": ["sci-fi"]}),
    )
    .await;
    create(
        &app,
        json!({"title": "Inception", "year": 2010, "runtime": "148 mins", "genres": ["thriller"]}),
    )
    .await;

    let response = get(&app, "/api/v1/movies?title=Matrix&page=1&page_size=10&sort=id").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "The Matrix");
    assert_eq!(json["metadata"]["total_records"], 1);
    assert_eq!(json["metadata"]["first_page"], 1);
    assert_eq!(json["metadata"]["last_page"], 1);
}

#[tokio::test]
async fn list_sorts_and_filters_by_genre() {
    let app = build_test_app();
    for (title, year, genre) in [("A", 1999, "drama"), ("B", 2005, "drama"), ("C", 1980, "comedy")] {
        create(
            &app,
            json!({"title": title, "year": year, "runtime": "90 mins", "genres": [genre]}),
        )
        .await;
    }

    let json = body_json(get(&app, "/api/v1/movies?genres=drama&sort=-year").await).await;
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["B", "A"]);
}

#[tokio::test]
async fn empty_list_has_empty_metadata() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/movies").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));
    assert_eq!(json["metadata"], json!({}));
}

#[tokio::test]
async fn invalid_filters_return_422() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/movies?page=0&page_size=500&sort=rating").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["page"], "must be greater than zero");
    assert_eq!(json["error"]["page_size"], "must be a maximum of 100");
    assert_eq!(json["error"]["sort"], "invalid sort value");
}

#[tokio::test]
async fn non_numeric_page_returns_400() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/movies?page=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Routing and store failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/nothing-here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn unsupported_method_returns_405() {
    let app = build_test_app();
    let response = common::send(&app, axum::http::Method::PUT, "/api/v1/movies", None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn cors_exposes_location_to_allowed_origins() {
    let app = build_test_app();
    let request = Request::builder()
        .uri("/health")
        .header(ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    let exposed = response.headers()[ACCESS_CONTROL_EXPOSE_HEADERS]
        .to_str()
        .unwrap()
        .to_lowercase();
    assert!(exposed.contains("location"));
    assert!(exposed.contains("x-request-id"));
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
}

#[tokio::test]
async fn slow_store_returns_503() {
    let store = Arc::new(MemoryMovieStore::with_latency(Duration::from_millis(200)));
    let app = common::build_app_with(store, Duration::from_millis(20));

    let response = get(&app, "/api/v1/movies").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "STORE_TIMEOUT");
}
