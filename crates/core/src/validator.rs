//! Field-keyed validation accumulator.
//!
//! A [`Validator`] collects at most one message per field key. The first
//! failure recorded for a key wins; later failures for the same key are
//! dropped, so callers can chain checks from most to least fundamental.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use crate::error::CoreError;

/// Field key -> human-readable message. Ordered for stable responses.
pub type ValidationErrors = BTreeMap<String, String>;

#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no failures have been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` under `key` unless `key` already has an entry.
    pub fn add_error(&mut self, key: &str, message: &str) {
        self.errors
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record `message` under `key` when `ok` is false.
    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// Convert into a `Result`, yielding [`CoreError::Validation`] when any
    /// failure was recorded.
    pub fn finish(self) -> Result<(), CoreError> {
        if self.valid() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.errors))
        }
    }
}

/// Returns `true` if `value` appears in `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// Returns `true` if every element of `values` is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let distinct: HashSet<&T> = values.iter().collect();
    distinct.len() == values.len()
}
