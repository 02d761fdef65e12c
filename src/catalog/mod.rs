//! Anime catalog client
//!
//! Defines the catalog records consumed by the bot and the
//! [`CatalogProvider`] interface, implemented for Jikan by [`JikanClient`].

/// Jikan wire format
pub mod dto;
/// HTTP request/response helpers
pub mod http_utils;
/// Jikan API client
pub mod jikan;

pub use jikan::JikanClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success HTTP status
    #[error("API error: {status} - {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Cleaned response body
        message: String,
    },
    /// Response body is not the expected JSON
    #[error("Decode error: {0}")]
    Decode(String),
}

/// One entry of a keyword search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Catalog identifier
    pub id: u32,
    /// Display title
    pub title: String,
    /// Premiere year
    pub year: Option<i32>,
}

/// Full catalog record for one title
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimeDetail {
    /// Catalog identifier
    pub id: u32,
    /// Display title
    pub title: String,
    /// Title in the original script
    pub title_native: Option<String>,
    /// Media kind (TV, Movie, OVA, ...)
    pub kind: Option<String>,
    /// Premiere year
    pub year: Option<i32>,
    /// Number of episodes
    pub episode_count: Option<u32>,
    /// Average user score out of 10
    pub score: Option<f64>,
    /// Airing status
    pub status: Option<String>,
    /// Plot summary
    pub synopsis: Option<String>,
    /// Age rating label, e.g. "PG-13 - Teens 13 or older"
    pub rating_label: Option<String>,
    /// Genre, explicit genre, theme and demographic names, in that order
    pub genre_tags: Vec<String>,
    /// Cover image URL
    pub cover_image_url: Option<String>,
}

/// Interface for anime catalogs.
///
/// Transport failures never escape as panics: `search` reports them as
/// `Err` so callers can tell "failed" from "nothing found", the fetch
/// methods collapse them into `None`. Every call is a single attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Keyword search, at most [`crate::config::SEARCH_RESULT_LIMIT`] results
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError>;

    /// Full record for one identifier
    async fn fetch_detail(&self, id: u32) -> Option<AnimeDetail>;

    /// One random record
    async fn fetch_random(&self) -> Option<AnimeDetail>;
}
