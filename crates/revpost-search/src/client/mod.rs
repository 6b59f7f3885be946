//! HTTP client for a SearxNG instance's JSON search endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use revpost_core::{SearchHit, SearchKind};

use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::types::{SearxResponse, SearxResult};

const SEARCH_LANGUAGE: &str = "ko-KR";

/// HTTP client for SearxNG's `/search?format=json` endpoint.
///
/// Maps 429 to [`SearchError::RateLimited`] and other non-2xx statuses to
/// [`SearchError::UnexpectedStatus`]; retries are the caller's job
/// (see [`crate::search_with_retry`]).
pub struct SearxClient {
    client: Client,
    base_url: Url,
}

impl SearxClient {
    /// Creates a client for the SearxNG instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Builds the search URL for `query` against the category matching `kind`.
    fn search_url(&self, query: &str, kind: SearchKind) -> Result<Url, SearchError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| SearchError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("categories", category(kind))
            .append_pair("language", SEARCH_LANGUAGE)
            .append_pair("safesearch", "1");
        Ok(url)
    }
}

impl SearchProvider for SearxClient {
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let url = self.search_url(query, kind)?;
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en;q=0.8")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(SearchError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed =
            serde_json::from_str::<SearxResponse>(&body).map_err(|e| SearchError::Deserialize {
                context: format!("{kind} search for \"{query}\""),
                source: e,
            })?;

        let hits = parsed
            .results
            .into_iter()
            .filter_map(|r| to_hit(r, kind))
            .take(max_results)
            .collect();
        Ok(hits)
    }
}

fn category(kind: SearchKind) -> &'static str {
    match kind {
        SearchKind::Text => "general",
        SearchKind::News => "news",
        SearchKind::Images => "images",
    }
}

fn to_hit(result: SearxResult, kind: SearchKind) -> Option<SearchHit> {
    let url = result.url.filter(|u| !u.trim().is_empty())?;
    let image_url = result.img_src.filter(|u| !u.trim().is_empty());
    if kind == SearchKind::Images && image_url.is_none() {
        return None;
    }
    let (width, height) = result
        .resolution
        .as_deref()
        .and_then(parse_resolution)
        .map_or((None, None), |(w, h)| (Some(w), Some(h)));

    Some(SearchHit {
        title: result.title.unwrap_or_default().trim().to_string(),
        body: result.content.unwrap_or_default().trim().to_string(),
        url,
        published_at: result.published_date,
        image_url,
        width,
        height,
    })
}

/// Parses `"1920 x 1080"`, `"1920x1080"` or `"1920×1080"` into `(width, height)`.
fn parse_resolution(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.split_once(['x', 'X', '×'])?;
    let width = w.trim().parse::<u32>().ok()?;
    let height = h.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
