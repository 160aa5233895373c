//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the in-memory study session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use studyaid_core::ports::{
    ContentGenerationService, KeywordService, TextExtractionService, TopicExtractionService,
    VideoSearchService, WebSearchService,
};
use studyaid_core::quiz::QuizSession;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<dyn TextExtractionService>,
    pub topics: Arc<dyn TopicExtractionService>,
    pub content: Arc<dyn ContentGenerationService>,
    pub keywords: Arc<dyn KeywordService>,
    pub videos: Arc<dyn VideoSearchService>,
    pub articles: Arc<dyn WebSearchService>,
    pub sessions: SessionStore,
}

//=========================================================================================
// StudySession (One Uploaded Document's Working Set)
//=========================================================================================

/// The server-side state behind one opaque session token: the extracted
/// topic list, the concept map, and at most one in-flight quiz attempt.
/// Replaced wholesale by a new upload.
pub struct StudySession {
    pub topics: Vec<String>,
    pub concept_map_html: Option<String>,
    pub quiz: Option<QuizSession>,
    last_accessed: Instant,
}

//=========================================================================================
// SessionStore (In-Memory, TTL-Expired)
//=========================================================================================

/// An in-memory session store keyed by opaque UUID tokens.
///
/// Abandoned sessions expire `ttl` after their last access; expired entries
/// are swept lazily whenever the store is touched.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, StudySession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Creates a fresh session for a newly uploaded document and returns its
    /// token. Any quiz state from other sessions is untouched; this user's
    /// previous session simply ages out.
    pub async fn create(&self, topics: Vec<String>, concept_map_html: Option<String>) -> Uuid {
        let mut sessions = self.inner.write().await;
        Self::sweep(&mut sessions, self.ttl);
        let id = Uuid::new_v4();
        sessions.insert(
            id,
            StudySession {
                topics,
                concept_map_html,
                quiz: None,
                last_accessed: Instant::now(),
            },
        );
        id
    }

    /// Runs `f` against the session, refreshing its TTL. Returns `None` for
    /// unknown or expired tokens.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut StudySession) -> R,
    ) -> Option<R> {
        let mut sessions = self.inner.write().await;
        Self::sweep(&mut sessions, self.ttl);
        let session = sessions.get_mut(&id)?;
        session.last_accessed = Instant::now();
        Some(f(session))
    }

    fn sweep(sessions: &mut HashMap<Uuid, StudySession>, ttl: Duration) {
        let now = Instant::now();
        sessions.retain(|_, s| now.duration_since(s.last_accessed) < ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_retrievable_until_they_expire() {
        let store = SessionStore::new(Duration::from_millis(40));
        let id = store.create(vec!["Sorting".to_string()], None).await;

        let topics = store
            .with_session(id, |s| s.topics.clone())
            .await
            .expect("fresh session should exist");
        assert_eq!(topics, vec!["Sorting"]);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.with_session(id, |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn access_refreshes_the_ttl() {
        let store = SessionStore::new(Duration::from_millis(80));
        let id = store.create(Vec::new(), None).await;

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert!(store.with_session(id, |_| ()).await.is_some());
        }
    }

    #[tokio::test]
    async fn unknown_token_is_none() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.with_session(Uuid::new_v4(), |_| ()).await.is_none());
    }
}
