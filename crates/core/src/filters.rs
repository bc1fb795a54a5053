//! Paging and ordering parameters for list queries.

use serde::Deserialize;

use crate::validator::{permitted_value, Validator};

/// Default page when the caller does not supply one.
pub const DEFAULT_PAGE: i64 = 1;

/// Default number of movies per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page number a caller may request.
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort keys accepted from callers. A leading `-` means descending.
pub const SORT_SAFELIST: &[&str] = &[
    "id", "-id", "title", "-title", "year", "-year", "runtime", "-runtime",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: "id".to_string(),
        }
    }
}

impl Filters {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    pub fn window(&self) -> Window {
        Window {
            limit: self.limit(),
            offset: self.offset(),
        }
    }

    pub fn sort(&self) -> Sort {
        Sort::parse(&self.sort)
    }
}

/// Record validation for list filters.
pub fn validate_filters(v: &mut Validator, filters: &Filters) {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(
        filters.page <= MAX_PAGE,
        "page",
        "must be a maximum of 10 million",
    );
    v.check(filters.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        filters.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    v.check(
        permitted_value(&filters.sort.as_str(), SORT_SAFELIST),
        "sort",
        "invalid sort value",
    );
}

/// A `LIMIT`/`OFFSET` pair applied to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Title,
    Year,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A resolved ordering. Only the closed set of columns can be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            column: SortColumn::Id,
            direction: SortDirection::Ascending,
        }
    }
}

impl Sort {
    /// Resolve a sort key. Anything outside the safelist sorts by ascending id.
    pub fn parse(key: &str) -> Self {
        let (direction, name) = match key.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (SortDirection::Ascending, key),
        };
        let column = match name {
            "id" => SortColumn::Id,
            "title" => SortColumn::Title,
            "year" => SortColumn::Year,
            "runtime" => SortColumn::Runtime,
            _ => return Self::default(),
        };
        Self { column, direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(page: i64, page_size: i64, sort: &str) -> Filters {
        Filters {
            page,
            page_size,
            sort: sort.to_string(),
        }
    }

    #[test]
    fn limit_and_offset() {
        let f = filters(3, 10, "id");
        assert_eq!(f.limit(), 10);
        assert_eq!(f.offset(), 20);
        assert_eq!(f.window(), Window { limit: 10, offset: 20 });
    }

    #[test]
    fn first_page_has_zero_offset() {
        assert_eq!(filters(1, 25, "id").offset(), 0);
    }

    #[test]
    fn defaults() {
        let f = Filters::default();
        assert_eq!((f.page, f.page_size, f.sort.as_str()), (1, 20, "id"));
    }

    #[test]
    fn valid_filters_pass() {
        let mut v = Validator::new();
        validate_filters(&mut v, &filters(1, 100, "-runtime"));
        assert!(v.valid());
    }

    #[test]
    fn out_of_range_filters_fail() {
        let mut v = Validator::new();
        validate_filters(&mut v, &filters(0, 101, "rating"));
        let errors = v.into_errors();
        assert_eq!(errors["page"], "must be greater than zero");
        assert_eq!(errors["page_size"], "must be a maximum of 100");
        assert_eq!(errors["sort"], "invalid sort value");
    }

    #[test]
    fn huge_page_fails() {
        let mut v = Validator::new();
        validate_filters(&mut v, &filters(MAX_PAGE + 1, 10, "id"));
        assert_eq!(v.errors()["page"], "must be a maximum of 10 million");
    }

    #[test]
    fn sort_resolves_direction_and_column() {
        assert_eq!(
            Sort::parse("-year"),
            Sort {
                column: SortColumn::Year,
                direction: SortDirection::Descending
            }
        );
        assert_eq!(
            Sort::parse("title"),
            Sort {
                column: SortColumn::Title,
                direction: SortDirection::Ascending
            }
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_ascending_id() {
        for key in ["", "-", "rating", "-rating", "--year"] {
            assert_eq!(Sort::parse(key), Sort::default(), "{key:?}");
        }
    }

    #[test]
    fn every_safelisted_key_resolves_explicitly() {
        for key in SORT_SAFELIST {
            let sort = Sort::parse(key);
            let descending = key.starts_with('-');
            assert_eq!(sort.direction == SortDirection::Descending, descending);
        }
    }
}
