use super::dto::{JikanAnime, JikanEnvelope};
use super::http_utils::{create_http_client, get_json};
use super::{AnimeDetail, CatalogError, CatalogProvider, SearchResult};
use crate::config::SEARCH_RESULT_LIMIT;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Client for the Jikan v4 REST API
pub struct JikanClient {
    http: HttpClient,
    base_url: String,
}

impl JikanClient {
    /// Create a client for `base_url` (e.g. `https://api.jikan.moe/v4`)
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: create_http_client(timeout),
            base_url,
        }
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_anime(&self, path: &str) -> Result<Option<AnimeDetail>, CatalogError> {
        let url = format!("{}{path}", self.base_url);
        let envelope: JikanEnvelope<JikanAnime> = get_json(&self.http, &url, &[]).await?;
        Ok(envelope.data.map(JikanAnime::into_detail))
    }
}

#[async_trait]
impl CatalogProvider for JikanClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        let url = format!("{}/anime", self.base_url);
        let params = [
            ("q", query.to_string()),
            ("limit", SEARCH_RESULT_LIMIT.to_string()),
        ];

        match get_json::<JikanEnvelope<Vec<JikanAnime>>>(&self.http, &url, &params).await {
            Ok(envelope) => {
                let results: Vec<SearchResult> = envelope
                    .data
                    .unwrap_or_default()
                    .into_iter()
                    .take(SEARCH_RESULT_LIMIT)
                    .map(JikanAnime::into_search_result)
                    .collect();
                debug!(query = %query, count = results.len(), "Catalog search completed");
                Ok(results)
            }
            Err(e) => {
                error!(query = %query, error = %e, "Catalog search failed");
                Err(e)
            }
        }
    }

    async fn fetch_detail(&self, id: u32) -> Option<AnimeDetail> {
        match self.fetch_anime(&format!("/anime/{id}/full")).await {
            Ok(Some(detail)) => Some(detail),
            Ok(None) => {
                warn!(anime_id = id, "Catalog returned no data for anime");
                None
            }
            Err(e) => {
                error!(anime_id = id, error = %e, "Failed to fetch anime details");
                None
            }
        }
    }

    async fn fetch_random(&self) -> Option<AnimeDetail> {
        match self.fetch_anime("/random/anime").await {
            Ok(Some(detail)) => Some(detail),
            Ok(None) => {
                warn!("Catalog returned no data for random anime");
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch random anime");
                None
            }
        }
    }
}
