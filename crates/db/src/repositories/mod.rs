//! Repository layer.
//!
//! Repositories own a store handle and expose the operations the rest of
//! the service calls. Every call is bounded by a deadline.

pub mod movie_repo;

pub use movie_repo::{MovieRepo, DEFAULT_STORE_TIMEOUT};
