//! services/api/src/web/resource_task.rs
//!
//! Orchestrates the per-topic resource lookup: keyword compression with a
//! silent fallback, then video search followed by article search. A backend
//! that is unavailable or unconfigured contributes an inline error entry
//! instead of aborting the other half of the results.

use std::sync::Arc;

use studyaid_core::domain::{Resource, ResourceKind};
use studyaid_core::ports::{KeywordService, VideoSearchService, WebSearchService};
use tracing::warn;

use crate::web::protocol::ResourceEntry;

const MAX_VIDEOS: u8 = 3;
const MAX_ARTICLES: u8 = 2;

/// A compressed keyword reply this much longer than the topic itself is
/// treated as implausible and discarded.
const KEYWORD_BLOWUP_FACTOR: f32 = 1.5;

fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Compresses `topic` into search keywords, falling back silently to the
/// raw topic when the call fails or the reply is implausibly long.
async fn search_terms(keywords: &Arc<dyn KeywordService>, topic: &str) -> String {
    match keywords.compress_keywords(topic).await {
        Ok(compressed)
            if (compressed.len() as f32) < topic.len() as f32 * KEYWORD_BLOWUP_FACTOR =>
        {
            compressed
        }
        Ok(overlong) => {
            warn!(
                topic,
                reply_len = overlong.len(),
                "keyword compression reply implausibly long, using topic verbatim"
            );
            topic.to_string()
        }
        Err(e) => {
            warn!(topic, error = %e, "keyword compression failed, using topic verbatim");
            topic.to_string()
        }
    }
}

/// Finds study resources for one topic: videos first, then articles.
pub async fn find_resources(
    keywords: &Arc<dyn KeywordService>,
    videos: &Arc<dyn VideoSearchService>,
    articles: &Arc<dyn WebSearchService>,
    topic: &str,
) -> Vec<ResourceEntry> {
    let terms = search_terms(keywords, topic).await;
    let mut entries = Vec::new();

    match videos
        .search_videos(&format!("{} tutorial explained", terms), MAX_VIDEOS)
        .await
    {
        Ok(hits) => entries.extend(hits.into_iter().map(|hit| {
            ResourceEntry::Found(Resource {
                kind: ResourceKind::Video,
                url: video_url(&hit.video_id),
                title: hit.title,
            })
        })),
        Err(e) => entries.push(ResourceEntry::Failed {
            error: format!("Could not fetch videos: {}", e),
        }),
    }

    match articles
        .search_articles(&format!("in-depth tutorial {}", terms), MAX_ARTICLES)
        .await
    {
        Ok(hits) => entries.extend(hits.into_iter().map(|hit| {
            ResourceEntry::Found(Resource {
                kind: ResourceKind::Article,
                title: hit.title,
                url: hit.link,
            })
        })),
        Err(e) => entries.push(ResourceEntry::Failed {
            error: format!("Could not fetch articles: {}", e),
        }),
    }

    entries
}
