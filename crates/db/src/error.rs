use std::time::Duration;

/// Every way a repository call can fail.
///
/// Callers match on the variant; nothing here is distinguished by message.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("Movie not found")]
    NotFound,

    #[error("Duplicate value violates unique constraint: {constraint}")]
    Duplicate { constraint: String },

    #[error("Store did not respond to {operation} within {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Store error: {0}")]
    Store(#[source] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    /// Classify a sqlx error, surfacing unique violations as [`RepoError::Duplicate`].
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                return RepoError::Duplicate {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        RepoError::Store(err)
    }
}
