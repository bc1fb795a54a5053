//! Store-independent search predicate for movie list queries.
//!
//! Callers describe *what* to match; each store backend translates the
//! predicate into its own query syntax.

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// What a list query should match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPredicate {
    /// Every movie.
    MatchAll,
    /// Movies whose title or genres contain any word of the search string.
    TextSearch(String),
}

impl SearchPredicate {
    /// Combine a title query and genre terms into a single predicate.
    ///
    /// Title and genres are folded into one search string (`title, g1, g2`);
    /// when both are empty every movie matches.
    pub fn from_query(title: &str, genres: &[String]) -> Self {
        let title = title.trim();
        let genres: Vec<&str> = genres
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect();

        match (title.is_empty(), genres.is_empty()) {
            (true, true) => Self::MatchAll,
            (false, true) => Self::TextSearch(title.to_string()),
            (true, false) => Self::TextSearch(genres.join(", ")),
            (false, false) => {
                let mut parts = Vec::with_capacity(genres.len() + 1);
                parts.push(title);
                parts.extend(genres);
                Self::TextSearch(parts.join(", "))
            }
        }
    }

    /// Lowercased word terms of the search string. Empty for `MatchAll`.
    pub fn terms(&self) -> Vec<String> {
        match self {
            Self::MatchAll => Vec::new(),
            Self::TextSearch(search) => tokenize(search),
        }
    }

    /// PostgreSQL `tsquery` matching any term, or `None` if nothing to match.
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_core::search::SearchPredicate;
    /// let p = SearchPredicate::from_query("The Matrix", &["sci-fi".to_string()]);
    /// assert_eq!(p.to_tsquery(), Some("the | matrix | sci | fi".to_string()));
    /// assert_eq!(SearchPredicate::MatchAll.to_tsquery(), None);
    /// ```
    pub fn to_tsquery(&self) -> Option<String> {
        let terms = self.terms();
        if terms.is_empty() {
            None
        } else {
            Some(terms.join(" | "))
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizing
// ---------------------------------------------------------------------------

/// Split text into lowercase alphanumeric words.
///
/// Anything that is not alphanumeric or `_` separates words, so the output
/// is always safe to splice into a tsquery.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
