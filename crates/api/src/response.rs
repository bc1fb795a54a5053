//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope; list responses add
//! pagination `metadata` next to it.

use marquee_core::pagination::Metadata;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": [...], "metadata": {...} }` envelope for paginated lists.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub metadata: Metadata,
}
