//! The movie record, its wire representation and its invariants.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::types::{MovieId, Timestamp};
use crate::validator::{unique, Validator};

/// First year a motion picture could have been released.
pub const EARLIEST_RELEASE_YEAR: i32 = 1888;

/// Maximum title length in bytes.
pub const MAX_TITLE_BYTES: usize = 500;

/// Maximum number of genres per movie.
pub const MAX_GENRES: usize = 5;

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Runtime in minutes. Stored as a plain integer, exchanged as `"N mins"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(pub i32);

impl Runtime {
    pub fn minutes(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl FromStr for Runtime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidRuntimeFormat(s.to_string());
        let parts: Vec<&str> = s.split(' ').collect();
        match parts.as_slice() {
            [minutes, "mins"] => minutes.parse().map(Runtime).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Movie
// ---------------------------------------------------------------------------

/// A catalog entry as held by the store.
///
/// `created_at` and `version` stay internal and are never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: MovieId,
    #[serde(skip)]
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    #[serde(skip)]
    pub version: i32,
}

impl Movie {
    /// Build a freshly inserted movie: new id, current timestamp, version 0.
    pub fn from_input(input: &MovieInput) -> Self {
        Self {
            id: MovieId::generate(),
            created_at: chrono::Utc::now(),
            title: input.title.clone(),
            year: input.year,
            runtime: input.runtime,
            genres: input.genres.clone().unwrap_or_default(),
            version: 0,
        }
    }

    /// Replace every mutable field with the values from `input`.
    pub fn replace_with(&mut self, input: &MovieInput) {
        self.title = input.title.clone();
        self.year = input.year;
        self.runtime = input.runtime;
        self.genres = input.genres.clone().unwrap_or_default();
    }

    /// The mutable fields of this movie as an input, e.g. to merge a patch.
    pub fn to_input(&self) -> MovieInput {
        MovieInput {
            title: self.title.clone(),
            year: self.year,
            runtime: self.runtime,
            genres: Some(self.genres.clone()),
        }
    }
}

/// Caller-supplied movie fields for insert and full replacement.
///
/// Missing fields deserialize to zero values so that validation reports
/// them as "must be provided".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovieInput {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Option<Vec<String>>,
}

/// Partial update. Only fields that are present overwrite the target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl MoviePatch {
    pub fn apply(self, target: &mut MovieInput) {
        if let Some(title) = self.title {
            target.title = title;
        }
        if let Some(year) = self.year {
            target.year = year;
        }
        if let Some(runtime) = self.runtime {
            target.runtime = runtime;
        }
        if let Some(genres) = self.genres {
            target.genres = Some(genres);
        }
    }
}

/// Run every movie invariant against `input`, recording failures in `v`.
pub fn validate_movie(v: &mut Validator, input: &MovieInput) {
    validate_movie_at(v, input, chrono::Utc::now().year());
}

fn validate_movie_at(v: &mut Validator, input: &MovieInput, current_year: i32) {
    v.check(!input.title.is_empty(), "title", "must be provided");
    v.check(
        input.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(input.year != 0, "year", "must be provided");
    v.check(
        input.year >= EARLIEST_RELEASE_YEAR,
        "year",
        "must be greater than 1888",
    );
    v.check(input.year <= current_year, "year", "must not be in the future");

    v.check(input.runtime.0 != 0, "runtime", "must be provided");
    v.check(input.runtime.0 > 0, "runtime", "must be a positive integer");

    v.check(input.genres.is_some(), "genres", "must be provided");
    let genres = input.genres.as_deref().unwrap_or_default();
    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(unique(genres), "genres", "must not contain duplicate values");
}
