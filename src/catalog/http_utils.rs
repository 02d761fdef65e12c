//! HTTP utilities for the catalog client
//!
//! Builds the shared client and turns raw responses into typed JSON or a
//! [`CatalogError`].

use super::CatalogError;
use crate::utils::truncate_str;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest response body kept in an error message
const ERROR_BODY_LIMIT: usize = 500;

/// Creates an HTTP client with a fixed per-request timeout.
#[must_use]
pub fn create_http_client(timeout: Duration) -> HttpClient {
    HttpClient::builder()
        .timeout(timeout)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Sends a GET request and parses the JSON response.
///
/// # Errors
///
/// Returns `CatalogError::Network` on connectivity issues and timeouts,
/// `CatalogError::Status` on non-success status codes, or
/// `CatalogError::Decode` if the body is not the expected JSON.
pub async fn get_json<T: DeserializeOwned>(
    client: &HttpClient,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, CatalogError> {
    let mut request = client.get(url);
    if !query.is_empty() {
        request = request.query(query);
    }

    let response = request
        .send()
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(CatalogError::Status {
            status: status.as_u16(),
            message: clean_error_body(&error_text),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;

    serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))
}

/// Shortens an error body for logging; HTML error pages from proxies are
/// summarised instead of quoted.
#[must_use]
pub fn clean_error_body(error_text: &str) -> String {
    let trimmed = error_text.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        "Server returned HTML error page".to_string()
    } else if error_text.chars().count() > ERROR_BODY_LIMIT {
        format!(
            "{}... (truncated)",
            truncate_str(error_text, ERROR_BODY_LIMIT)
        )
    } else {
        error_text.to_string()
    }
}
