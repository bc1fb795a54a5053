//! Row mapping for the `movies` table.

use marquee_core::movie::{Movie, Runtime};
use marquee_core::types::{MovieId, Timestamp};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `movies` table.
#[derive(Debug, Clone, FromRow)]
pub struct MovieRow {
    pub id: Uuid,
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
    pub version: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: MovieId::from_uuid(row.id),
            created_at: row.created_at,
            title: row.title,
            year: row.year,
            runtime: Runtime(row.runtime),
            genres: row.genres,
            version: row.version,
        }
    }
}
