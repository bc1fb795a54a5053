//! PostgreSQL backend for the `movies` table.

use async_trait::async_trait;
use marquee_core::filters::{Sort, SortColumn, SortDirection, Window};
use marquee_core::movie::{Movie, MovieInput};
use marquee_core::search::SearchPredicate;
use marquee_core::types::MovieId;
use sqlx::PgPool;

use crate::error::{RepoError, RepoResult};
use crate::models::movie::MovieRow;
use crate::store::MovieStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

/// Full-text match against the indexed search document.
const TEXT_MATCH: &str = "movie_search_document(title, genres) @@ to_tsquery('english', $1)";

/// Movie store backed by a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// A translated predicate: the `WHERE` clause and the tsquery it binds as `$1`.
struct Filter {
    clause: String,
    tsquery: Option<String>,
}

impl Filter {
    fn from_predicate(predicate: &SearchPredicate) -> Self {
        match (predicate, predicate.to_tsquery()) {
            (SearchPredicate::MatchAll, _) => Self {
                clause: String::new(),
                tsquery: None,
            },
            (SearchPredicate::TextSearch(_), Some(tsquery)) => Self {
                clause: format!(" WHERE {TEXT_MATCH}"),
                tsquery: Some(tsquery),
            },
            // A search with no usable words matches nothing.
            (SearchPredicate::TextSearch(_), None) => Self {
                clause: " WHERE FALSE".to_string(),
                tsquery: None,
            },
        }
    }

    /// Index of the first placeholder after the filter's own parameters.
    fn next_param(&self) -> u32 {
        if self.tsquery.is_some() {
            2
        } else {
            1
        }
    }
}

/// Translate a resolved sort into an `ORDER BY` clause.
///
/// Ties are broken by ascending id so that paging is stable.
fn order_by(sort: Sort) -> String {
    let column = match sort.column {
        SortColumn::Id => "id",
        SortColumn::Title => "title",
        SortColumn::Year => "year",
        SortColumn::Runtime => "runtime",
    };
    let direction = match sort.direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };
    if sort.column == SortColumn::Id {
        format!(" ORDER BY id {direction}")
    } else {
        format!(" ORDER BY {column} {direction}, id ASC")
    }
}

fn limit_offset(first_param: u32) -> String {
    let offset_param = first_param + 1;
    format!(" LIMIT ${first_param} OFFSET ${offset_param}")
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn insert(&self, movie: &Movie) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO movies (id, created_at, title, year, runtime, genres, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(movie.id.as_uuid())
        .bind(movie.created_at)
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime.minutes())
        .bind(&movie.genres)
        .bind(movie.version)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;
        Ok(())
    }

    async fn increment_version(&self, id: MovieId) -> RepoResult<()> {
        sqlx::query("UPDATE movies SET version = version + 1 WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;
        Ok(())
    }

    async fn find(&self, id: MovieId) -> RepoResult<Option<Movie>> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;
        Ok(row.map(Movie::from))
    }

    async fn replace(&self, id: MovieId, input: &MovieInput) -> RepoResult<u64> {
        let genres = input.genres.clone().unwrap_or_default();
        let result = sqlx::query(
            "UPDATE movies SET
                title = $2,
                year = $3,
                runtime = $4,
                genres = $5,
                version = version + 1
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(&input.title)
        .bind(input.year)
        .bind(input.runtime.minutes())
        .bind(&genres)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn remove(&self, id: MovieId) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn count(&self, predicate: &SearchPredicate, window: Option<Window>) -> RepoResult<i64> {
        let filter = Filter::from_predicate(predicate);
        let query = match window {
            Some(_) => format!(
                "SELECT COUNT(*) FROM (SELECT 1 FROM movies{}{}) AS windowed",
                filter.clause,
                limit_offset(filter.next_param()),
            ),
            None => format!("SELECT COUNT(*) FROM movies{}", filter.clause),
        };

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(tsquery) = &filter.tsquery {
            q = q.bind(tsquery);
        }
        if let Some(window) = window {
            q = q.bind(window.limit).bind(window.offset);
        }
        q.fetch_one(&self.pool).await.map_err(RepoError::from_sqlx)
    }

    async fn find_page(
        &self,
        predicate: &SearchPredicate,
        sort: Sort,
        window: Window,
    ) -> RepoResult<Vec<Movie>> {
        let filter = Filter::from_predicate(predicate);
        let query = format!(
            "SELECT {COLUMNS} FROM movies{}{}{}",
            filter.clause,
            order_by(sort),
            limit_offset(filter.next_param()),
        );

        let mut q = sqlx::query_as::<_, MovieRow>(&query);
        if let Some(tsquery) = &filter.tsquery {
            q = q.bind(tsquery);
        }
        let rows = q
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn ping(&self) -> RepoResult<()> {
        crate::health_check(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }
}
