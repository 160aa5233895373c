//! services/api/src/adapters/youtube.rs
//!
//! This module contains the adapter for the video search backend. It
//! implements the `VideoSearchService` port against the YouTube Data API v3
//! search endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use studyaid_core::ports::{PortError, PortResult, VideoHit, VideoSearchService};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

//=========================================================================================
// Upstream Response Records
//=========================================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct VideoId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `VideoSearchService` against the YouTube Data API.
#[derive(Clone)]
pub struct YouTubeSearchAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl YouTubeSearchAdapter {
    /// Creates a new `YouTubeSearchAdapter`. A missing key is allowed: calls
    /// then short-circuit with a "not configured" error.
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl VideoSearchService for YouTubeSearchAdapter {
    async fn search_videos(&self, query: &str, max_results: u8) -> PortResult<Vec<VideoHit>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PortError::NotConfigured("YOUTUBE_API_KEY"))?;

        let max_results = max_results.to_string();
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Upstream(format!(
                "YouTube search returned HTTP {}",
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
            .filter_map(|item| {
                item.id.video_id.map(|video_id| VideoHit {
                    title: item.snippet.title,
                    video_id,
                })
            })
            .collect())
    }
}
