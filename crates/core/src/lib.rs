//! Domain layer for the marquee catalog service.
//!
//! Everything here is pure logic with no I/O: the movie record and its
//! invariants, the field validator, list filters, pagination metadata and
//! the store-independent search predicate.

pub mod error;
pub mod filters;
pub mod movie;
pub mod pagination;
pub mod search;
pub mod types;
pub mod validator;
