//! services/api/src/adapters/websearch.rs
//!
//! This module contains the adapter for the general web search backend. It
//! implements the `WebSearchService` port against Google Custom Search.

use async_trait::async_trait;
use serde::Deserialize;
use studyaid_core::ports::{ArticleHit, PortError, PortResult, WebSearchService};

const SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    title: String,
    link: String,
}

/// An adapter that implements `WebSearchService` against Google Custom Search.
/// Needs both an API key and a search engine id; either one missing disables
/// the feature.
#[derive(Clone)]
pub struct GoogleSearchAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
    engine_id: Option<String>,
}

impl GoogleSearchAdapter {
    pub fn new(http: reqwest::Client, api_key: Option<String>, engine_id: Option<String>) -> Self {
        Self {
            http,
            api_key,
            engine_id,
        }
    }
}

#[async_trait]
impl WebSearchService for GoogleSearchAdapter {
    async fn search_articles(
        &self,
        query: &str,
        max_results: u8,
    ) -> PortResult<Vec<ArticleHit>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PortError::NotConfigured("GOOGLE_SEARCH_API_KEY"))?;
        let engine_id = self
            .engine_id
            .as_deref()
            .ok_or(PortError::NotConfigured("SEARCH_ENGINE_ID"))?;

        let max_results = max_results.to_string();
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("key", api_key),
                ("cx", engine_id),
                ("q", query),
                ("num", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Upstream(format!(
                "Web search returned HTTP {}",
                response.status()
            )));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))?;

        Ok(payload
            .items
            .into_iter()
            .map(|item| ArticleHit {
                title: item.title,
                link: item.link,
            })
            .collect())
    }
}
