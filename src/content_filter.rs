//! Mature content classification
//!
//! A title is mature when any of three independent signals fires:
//! a forbidden genre/theme/demographic tag, a blocklisted phrase in the
//! synopsis, or an adult rating label.

use crate::catalog::AnimeDetail;
use crate::config::Settings;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

/// Rating label fragments that always mean adult content
const ADULT_RATING_MARKERS: &[&str] = &["rx", "hentai"];

/// Errors raised while building a [`ContentPolicy`]
#[derive(Error, Debug)]
pub enum ContentPolicyError {
    /// A blocklist entry is not a valid regex
    #[error("Invalid blocklist pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },
}

/// Immutable content filter built once at startup
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    forbidden_tags: HashSet<String>,
    blocklist: Vec<Regex>,
}

impl ContentPolicy {
    /// Compile a policy from tag names and blocklist regexes.
    ///
    /// # Errors
    ///
    /// Returns `ContentPolicyError::InvalidPattern` for the first pattern
    /// that fails to compile.
    pub fn new<T, P>(forbidden_tags: T, patterns: P) -> Result<Self, ContentPolicyError>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let blocklist = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).map_err(|source| ContentPolicyError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            forbidden_tags: forbidden_tags.into_iter().map(Into::into).collect(),
            blocklist,
        })
    }

    /// Build the policy from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured blocklist pattern is invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self, ContentPolicyError> {
        Self::new(settings.forbidden_tags(), settings.blocklist_patterns())
    }

    /// Number of compiled blocklist patterns
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.blocklist.len()
    }

    /// Number of forbidden tags
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.forbidden_tags.len()
    }

    /// Decide whether a record is mature. Pure and total.
    ///
    /// # Examples
    ///
    /// ```
    /// use anime_lookup_bot::catalog::AnimeDetail;
    /// use anime_lookup_bot::content_filter::ContentPolicy;
    ///
    /// let policy = ContentPolicy::new(["Hentai"], [r"\bnsfw\b"]).unwrap();
    /// let detail = AnimeDetail {
    ///     rating_label: Some("Rx - Hentai".to_string()),
    ///     ..Default::default()
    /// };
    /// assert!(policy.is_mature(&detail));
    /// ```
    #[must_use]
    pub fn is_mature(&self, detail: &AnimeDetail) -> bool {
        self.has_forbidden_tag(detail)
            || self.synopsis_is_blocked(detail)
            || has_adult_rating(detail)
    }

    fn has_forbidden_tag(&self, detail: &AnimeDetail) -> bool {
        detail
            .genre_tags
            .iter()
            .any(|tag| self.forbidden_tags.contains(tag))
    }

    fn synopsis_is_blocked(&self, detail: &AnimeDetail) -> bool {
        let Some(synopsis) = detail.synopsis.as_deref() else {
            return false;
        };
        let lowered = synopsis.to_lowercase();
        self.blocklist.iter().any(|re| re.is_match(&lowered))
    }
}

fn has_adult_rating(detail: &AnimeDetail) -> bool {
    detail.rating_label.as_deref().is_some_and(|rating| {
        let lowered = rating.to_lowercase();
        ADULT_RATING_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
    })
}
