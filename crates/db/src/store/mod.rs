//! Store backends for movie documents.
//!
//! A [`MovieStore`] translates the store-independent [`SearchPredicate`] and
//! [`Sort`] into its own query language. Backends hold no per-call state and
//! must be safe to share across concurrent requests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use marquee_core::filters::{Sort, Window};
use marquee_core::movie::{Movie, MovieInput};
use marquee_core::search::SearchPredicate;
use marquee_core::types::MovieId;

use crate::error::RepoResult;

pub use memory::MemoryMovieStore;
pub use postgres::PgMovieStore;

#[async_trait]
pub trait MovieStore: Send + Sync + 'static {
    /// Persist a new movie exactly as given, including its id and timestamp.
    async fn insert(&self, movie: &Movie) -> RepoResult<()>;

    /// Add one to the version of `id`. A missing movie is not an error.
    async fn increment_version(&self, id: MovieId) -> RepoResult<()>;

    /// Fetch a movie by id.
    async fn find(&self, id: MovieId) -> RepoResult<Option<Movie>>;

    /// Overwrite the mutable fields of `id` and bump its version.
    /// Returns the number of movies matched.
    async fn replace(&self, id: MovieId, input: &MovieInput) -> RepoResult<u64>;

    /// Remove `id`. Returns the number of movies removed.
    async fn remove(&self, id: MovieId) -> RepoResult<u64>;

    /// Count movies matching `predicate`, restricted to `window` when given.
    async fn count(&self, predicate: &SearchPredicate, window: Option<Window>) -> RepoResult<i64>;

    /// Fetch one window of movies matching `predicate`, in `sort` order.
    async fn find_page(
        &self,
        predicate: &SearchPredicate,
        sort: Sort,
        window: Window,
    ) -> RepoResult<Vec<Movie>>;

    /// Confirm the backend is reachable.
    async fn ping(&self) -> RepoResult<()>;
}
