//! Pagination metadata returned alongside list results.

use serde::Serialize;

/// Derived paging summary. Zero-valued fields are omitted when serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Build metadata for a result set of `total_records` rows.
///
/// Returns all-zero metadata when there are no records.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
