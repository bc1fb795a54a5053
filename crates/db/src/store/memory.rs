//! In-process movie store.
//!
//! Mirrors the PostgreSQL backend's semantics without a database: text
//! search matches any query word against the words of a movie's title and
//! genres, case-insensitively. English stop words are dropped from the query
//! as the `english` text search config does. Words are not stemmed, so
//! `heroes` does not find `hero` here although it does in PostgreSQL.
//!
//! Useful for tests and for running the service without PostgreSQL.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use marquee_core::filters::{Sort, SortColumn, SortDirection, Window};
use marquee_core::movie::{Movie, MovieInput};
use marquee_core::search::{tokenize, SearchPredicate};
use marquee_core::types::MovieId;
use tokio::sync::RwLock;

use crate::error::{RepoError, RepoResult};
use crate::store::MovieStore;

#[derive(Debug, Default)]
pub struct MemoryMovieStore {
    movies: RwLock<BTreeMap<MovieId, Movie>>,
    latency: Option<Duration>,
}

impl MemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that sleeps for `latency` before every operation.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.movies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.movies.read().await.is_empty()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Words the PostgreSQL `english` config never indexes or searches for.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "don", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "s", "same", "she",
    "should", "so", "some", "such", "t", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Query words a text search looks for, or `None` when every movie matches.
fn search_terms(predicate: &SearchPredicate) -> Option<Vec<String>> {
    match predicate {
        SearchPredicate::MatchAll => None,
        SearchPredicate::TextSearch(_) => Some(
            predicate
                .terms()
                .into_iter()
                .filter(|term| !STOP_WORDS.contains(&term.as_str()))
                .collect(),
        ),
    }
}

fn matches(movie: &Movie, terms: Option<&[String]>) -> bool {
    let Some(terms) = terms else {
        return true;
    };
    let mut words = tokenize(&movie.title);
    for genre in &movie.genres {
        words.extend(tokenize(genre));
    }
    terms.iter().any(|term| words.contains(term))
}

fn compare(a: &Movie, b: &Movie, sort: Sort) -> Ordering {
    let primary = match sort.column {
        SortColumn::Id => a.id.cmp(&b.id),
        SortColumn::Title => a.title.cmp(&b.title),
        SortColumn::Year => a.year.cmp(&b.year),
        SortColumn::Runtime => a.runtime.cmp(&b.runtime),
    };
    let primary = match sort.direction {
        SortDirection::Ascending => primary,
        SortDirection::Descending => primary.reverse(),
    };
    if sort.column == SortColumn::Id {
        primary
    } else {
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Apply `window` to `len` items, returning the index range it selects.
fn window_range(len: usize, window: Window) -> std::ops::Range<usize> {
    let start = usize::try_from(window.offset.max(0)).unwrap_or(usize::MAX).min(len);
    let take = usize::try_from(window.limit.max(0)).unwrap_or(usize::MAX);
    start..start.saturating_add(take).min(len)
}

#[async_trait]
impl MovieStore for MemoryMovieStore {
    async fn insert(&self, movie: &Movie) -> RepoResult<()> {
        self.delay().await;
        let mut movies = self.movies.write().await;
        if movies.contains_key(&movie.id) {
            return Err(RepoError::Duplicate {
                constraint: "movies_pkey".to_string(),
            });
        }
        movies.insert(movie.id, movie.clone());
        Ok(())
    }

    async fn increment_version(&self, id: MovieId) -> RepoResult<()> {
        self.delay().await;
        if let Some(movie) = self.movies.write().await.get_mut(&id) {
            movie.version += 1;
        }
        Ok(())
    }

    async fn find(&self, id: MovieId) -> RepoResult<Option<Movie>> {
        self.delay().await;
        Ok(self.movies.read().await.get(&id).cloned())
    }

    async fn replace(&self, id: MovieId, input: &MovieInput) -> RepoResult<u64> {
        self.delay().await;
        match self.movies.write().await.get_mut(&id) {
            Some(movie) => {
                movie.replace_with(input);
                movie.version += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, id: MovieId) -> RepoResult<u64> {
        self.delay().await;
        Ok(u64::from(self.movies.write().await.remove(&id).is_some()))
    }

    async fn count(&self, predicate: &SearchPredicate, window: Option<Window>) -> RepoResult<i64> {
        self.delay().await;
        let terms = search_terms(predicate);
        let movies = self.movies.read().await;
        let matching = movies
            .values()
            .filter(|m| matches(m, terms.as_deref()))
            .count();
        let counted = match window {
            Some(window) => window_range(matching, window).len(),
            None => matching,
        };
        Ok(i64::try_from(counted).unwrap_or(i64::MAX))
    }

    async fn find_page(
        &self,
        predicate: &SearchPredicate,
        sort: Sort,
        window: Window,
    ) -> RepoResult<Vec<Movie>> {
        self.delay().await;
        let terms = search_terms(predicate);
        let movies = self.movies.read().await;
        let mut matching: Vec<&Movie> = movies
            .values()
            .filter(|m| matches(m, terms.as_deref()))
            .collect();
        matching.sort_by(|a, b| compare(a, b, sort));
        let range = window_range(matching.len(), window);
        Ok(matching[range].iter().map(|m| (*m).clone()).collect())
    }

    async fn ping(&self) -> RepoResult<()> {
        self.delay().await;
        Ok(())
    }
}
