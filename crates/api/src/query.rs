//! Query parameter types for API handlers.

use marquee_core::filters::{Filters, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use serde::Deserialize;

/// Query parameters for `GET /movies`
/// (`?title=&genres=a,b&page=&page_size=&sort=`).
#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesParams {
    pub title: Option<String>,
    /// Comma-separated genre terms.
    pub genres: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort: Option<String>,
}

impl ListMoviesParams {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn genres(&self) -> Vec<String> {
        self.genres
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect()
    }

    pub fn filters(&self) -> Filters {
        Filters {
            page: self.page.unwrap_or(DEFAULT_PAGE),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort: self.sort.clone().unwrap_or_else(|| "id".to_string()),
        }
    }
}
