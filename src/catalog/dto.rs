//! Jikan v4 response shapes and their mapping into catalog records.
//!
//! Every field except `mal_id` is optional on the wire; missing values
//! become `None` or an empty list instead of a decode failure.

use super::{AnimeDetail, SearchResult};
use serde::{Deserialize, Serialize};

/// `{ "data": ... }` envelope shared by all Jikan endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JikanEnvelope<T> {
    /// Payload, absent on some error bodies
    pub data: Option<T>,
}

/// Anime object as returned by `/anime`, `/anime/{id}/full` and `/random/anime`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanAnime {
    /// MyAnimeList identifier
    pub mal_id: u32,
    /// Default title
    pub title: Option<String>,
    /// Japanese title
    pub title_japanese: Option<String>,
    /// TV, Movie, OVA, ...
    #[serde(rename = "type")]
    pub anime_type: Option<String>,
    /// Episode count
    pub episodes: Option<u32>,
    /// Airing status
    pub status: Option<String>,
    /// Age rating label
    pub rating: Option<String>,
    /// Score out of 10
    pub score: Option<f64>,
    /// Plot summary
    pub synopsis: Option<String>,
    /// Premiere year
    pub year: Option<i32>,
    /// Cover images
    pub images: Option<JikanImages>,
    /// Genres
    pub genres: Vec<JikanEntity>,
    /// Explicit genres (Hentai, Erotica)
    pub explicit_genres: Vec<JikanEntity>,
    /// Themes
    pub themes: Vec<JikanEntity>,
    /// Target demographics
    pub demographics: Vec<JikanEntity>,
}

/// Image sets by format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanImages {
    /// JPEG variants
    pub jpg: Option<JikanImageSet>,
}

/// Image URLs of one format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanImageSet {
    /// Regular size
    pub image_url: Option<String>,
}

/// Named reference to a genre, theme or demographic
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanEntity {
    /// Display name
    pub name: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl JikanAnime {
    /// Maps the wire object into a search entry
    #[must_use]
    pub fn into_search_result(self) -> SearchResult {
        SearchResult {
            id: self.mal_id,
            title: self.title.unwrap_or_default(),
            year: self.year,
        }
    }

    /// Maps the wire object into a full record
    #[must_use]
    pub fn into_detail(self) -> AnimeDetail {
        let cover_image_url = self
            .images
            .and_then(|images| images.jpg)
            .and_then(|jpg| non_empty(jpg.image_url));

        let genre_tags = self
            .genres
            .into_iter()
            .chain(self.explicit_genres)
            .chain(self.themes)
            .chain(self.demographics)
            .map(|entity| entity.name)
            .filter(|name| !name.is_empty())
            .collect();

        AnimeDetail {
            id: self.mal_id,
            title: self.title.unwrap_or_default(),
            title_native: non_empty(self.title_japanese),
            kind: non_empty(self.anime_type),
            year: self.year,
            episode_count: self.episodes,
            score: self.score,
            status: non_empty(self.status),
            synopsis: non_empty(self.synopsis),
            rating_label: non_empty(self.rating),
            genre_tags,
            cover_image_url,
        }
    }
}
