//! Repository for movies.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use marquee_core::filters::Filters;
use marquee_core::movie::{Movie, MovieInput};
use marquee_core::pagination::{calculate_metadata, Metadata};
use marquee_core::search::SearchPredicate;
use marquee_core::types::MovieId;

use crate::error::{RepoError, RepoResult};
use crate::store::MovieStore;

/// Deadline applied to every repository call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Provides CRUD and list operations for movies.
///
/// Cheap to clone; clones share the same store handle. The repository holds
/// no per-call state, so it can be used from any number of tasks at once.
///
/// Input is expected to have passed `validate_movie` already; nothing is
/// re-checked here.
#[derive(Clone)]
pub struct MovieRepo {
    store: Arc<dyn MovieStore>,
    timeout: Duration,
}

impl std::fmt::Debug for MovieRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieRepo")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MovieRepo {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn MovieStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `fut` under the repository deadline.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> RepoResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.timeout, "Store deadline exceeded");
                Err(RepoError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }

    /// Insert a new movie, returning its assigned id.
    ///
    /// Written in two steps: the document with version 0, then a version
    /// bump to 1. The two writes are not atomic. Once the first write
    /// succeeds the movie exists, so a failed bump only leaves it at
    /// version 0.
    pub async fn insert(&self, input: &MovieInput) -> RepoResult<MovieId> {
        let movie = Movie::from_input(input);
        let id = movie.id;

        self.bounded("insert", async {
            self.store.insert(&movie).await?;
            if let Err(err) = self.store.increment_version(id).await {
                tracing::warn!(%id, error = %err, "Movie stored but version bump failed");
            }
            Ok::<_, RepoError>(())
        })
        .await?;

        tracing::debug!(%id, title = %movie.title, "Movie inserted");
        Ok(id)
    }

    /// Fetch a movie by its external id.
    pub async fn get(&self, id: &str) -> RepoResult<Movie> {
        let id = parse_id(id)?;
        self.bounded("get", self.store.find(id))
            .await?
            .ok_or(RepoError::NotFound)
    }

    /// Replace the mutable fields of a movie and bump its version.
    ///
    /// The version is incremented unconditionally; concurrent updates are
    /// applied in whatever order the store receives them. An id that matches
    /// nothing is not an error.
    pub async fn update(&self, input: &MovieInput, id: &str) -> RepoResult<()> {
        let id = parse_id(id)?;
        let matched = self.bounded("update", self.store.replace(id, input)).await?;
        tracing::debug!(%id, matched, "Movie updated");
        Ok(())
    }

    /// Permanently delete a movie.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let id = parse_id(id)?;
        let removed = self.bounded("delete", self.store.remove(id)).await?;
        if removed == 0 {
            return Err(RepoError::NotFound);
        }
        tracing::debug!(%id, "Movie deleted");
        Ok(())
    }

    /// List one page of movies matching the title and genre queries.
    ///
    /// The count behind the metadata is taken over the same window as the
    /// page itself, so `total_records` never exceeds the page size.
    pub async fn get_all(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> RepoResult<(Vec<Movie>, Metadata)> {
        let predicate = SearchPredicate::from_query(title, genres);
        let sort = filters.sort();
        let window = filters.window();

        self.bounded("get_all", async {
            let count = self.store.count(&predicate, Some(window)).await?;
            let metadata = calculate_metadata(count, filters.page, filters.page_size);
            let movies = self.store.find_page(&predicate, sort, window).await?;
            tracing::debug!(?predicate, ?sort, count, returned = movies.len(), "Movies listed");
            Ok::<_, RepoError>((movies, metadata))
        })
        .await
    }

    /// Confirm the underlying store is reachable.
    pub async fn ping(&self) -> RepoResult<()> {
        self.bounded("ping", self.store.ping()).await
    }
}

fn parse_id(raw: &str) -> RepoResult<MovieId> {
    raw.parse::<MovieId>()
        .map_err(|_| RepoError::InvalidId(raw.to_string()))
}
