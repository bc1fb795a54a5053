use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marquee_core::error::CoreError;
use marquee_db::error::RepoError;
use serde_json::{json, Value};

const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub(crate) const INTERNAL_MESSAGE: &str = "the server encountered a problem and could not process your request";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`RepoError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `marquee_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence error from `marquee_db`.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route matches the request path.
    #[error("Route not found")]
    RouteNotFound,

    /// The route exists but not for this method.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message): (StatusCode, &str, Value) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::InvalidId(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", NOT_FOUND_MESSAGE.into())
                }
                CoreError::InvalidRuntimeFormat(_) => (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    core.to_string().into(),
                ),
                CoreError::Validation(errors) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    json!(errors),
                ),
            },

            // --- Repository errors ---
            AppError::Repo(repo) => classify_repo_error(repo),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.as_str().into())
            }
            AppError::RouteNotFound => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", NOT_FOUND_MESSAGE.into())
            }
            AppError::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                format!("the {method} method is not supported for this resource").into(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a repository error into an HTTP status, error code, and message.
///
/// - `InvalidId` and `NotFound` map to 404.
/// - `Duplicate` maps to 409.
/// - `Timeout` maps to 503.
/// - Store failures map to 500 with a sanitized message.
fn classify_repo_error(err: &RepoError) -> (StatusCode, &'static str, Value) {
    match err {
        RepoError::InvalidId(_) | RepoError::NotFound => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", NOT_FOUND_MESSAGE.into())
        }
        RepoError::Duplicate { constraint } => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}").into(),
        ),
        RepoError::Timeout { .. } => {
            tracing::warn!(error = %err, "Store timeout");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_TIMEOUT",
                "the store did not respond in time, please try again".into(),
            )
        }
        RepoError::Store(inner) => {
            tracing::error!(error = %inner, "Store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.into(),
            )
        }
    }
}
