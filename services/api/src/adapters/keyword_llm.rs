//! services/api/src/adapters/keyword_llm.rs
//!
//! This module contains the adapter that compresses a topic into a short
//! search query. It implements the `KeywordService` port from the `core`
//! crate. Callers treat any failure here as non-fatal and fall back to the
//! raw topic string.

use std::sync::Arc;

use async_trait::async_trait;
use studyaid_core::ports::{CompletionService, KeywordService, PortError, PortResult};

const KEYWORD_PROMPT: &str = r#"You are a search assistant. Compress the following study topic into 3-5 search keywords that would find good tutorials about it.

RULES:
1. Respond with ONLY the keywords, separated by single spaces.
2. No punctuation, no quotes, no explanation.

Topic: "{topic}""#;

pub struct LlmKeywordAdapter {
    completion: Arc<dyn CompletionService>,
}

impl LlmKeywordAdapter {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl KeywordService for LlmKeywordAdapter {
    async fn compress_keywords(&self, topic: &str) -> PortResult<String> {
        let prompt = KEYWORD_PROMPT.replace("{topic}", topic);
        let reply = self.completion.complete(&prompt).await?;
        let keywords = reply.trim().trim_matches('"').to_string();
        if keywords.is_empty() {
            return Err(PortError::EmptyResponse);
        }
        Ok(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedCompletion(String);

    #[async_trait]
    impl CompletionService for CannedCompletion {
        async fn complete(&self, _prompt: &str) -> PortResult<String> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn trims_quotes_and_whitespace() {
        let adapter =
            LlmKeywordAdapter::new(Arc::new(CannedCompletion("  \"rust async tokio\" ".into())));
        assert_eq!(
            adapter.compress_keywords("Async in Rust").await.unwrap(),
            "rust async tokio"
        );
    }

    #[tokio::test]
    async fn empty_reply_is_an_error() {
        let adapter = LlmKeywordAdapter::new(Arc::new(CannedCompletion("  ".into())));
        assert!(matches!(
            adapter.compress_keywords("Topic").await,
            Err(PortError::EmptyResponse)
        ));
    }
}
