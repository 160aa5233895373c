//! services/api/src/adapters/topic_llm.rs
//!
//! This module contains the topic-extraction pipeline. The primary strategy
//! implements the `TopicExtractionService` port by composing the
//! `CompletionService` port with a line-splitting prompt; when the LLM is
//! unconfigured or finds nothing, the deterministic strategies from the core
//! crate take over.

use std::sync::Arc;

use async_trait::async_trait;
use studyaid_core::ports::{CompletionService, PortError, PortResult, TopicExtractionService};
use studyaid_core::topics::{
    dedup_preserving_order, NounPhraseExtractor, RuleBasedExtractor, TopicStrategy,
};
use tracing::warn;

/// Only the first part of the document is sent, to keep the call fast.
const SNIPPET_LIMIT: usize = 2500;

const TOPIC_PROMPT_TEMPLATE: &str = r#"You are an expert at analyzing documents. Read the following text and identify the main topics, concepts, or headings.

RULES:
1. Return a simple list of strings, with each topic on a new line.
2. Do NOT use numbers or bullet points (like * or -).
3. Do NOT return any other text, explanation, or titles like "Extracted Topics:".
4. Focus on phrases that represent key subjects in the document.

Text to analyze:
---
{text}
---"#;

/// LLM-first topic extraction with deterministic fallbacks.
pub struct TopicExtractionPipeline {
    completion: Arc<dyn CompletionService>,
    rules: RuleBasedExtractor,
    noun_phrases: NounPhraseExtractor,
}

impl TopicExtractionPipeline {
    /// Creates a new `TopicExtractionPipeline`.
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            rules: RuleBasedExtractor,
            noun_phrases: NounPhraseExtractor,
        }
    }

    /// Takes a prefix of at most `SNIPPET_LIMIT` characters on a char
    /// boundary.
    fn snippet(text: &str) -> String {
        text.chars().take(SNIPPET_LIMIT).collect()
    }

    async fn llm_topics(&self, text: &str) -> PortResult<Vec<String>> {
        let prompt = TOPIC_PROMPT_TEMPLATE.replace("{text}", &Self::snippet(text));
        let reply = self.completion.complete(&prompt).await?;

        // One topic per line; trim and drop empties.
        let topics: Vec<String> = reply
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if topics.is_empty() {
            return Err(PortError::NoTopics);
        }
        Ok(dedup_preserving_order(topics))
    }

    /// Heading rules first, noun phrases as the last resort.
    fn fallback_topics(&self, text: &str) -> Vec<String> {
        let topics = self.rules.extract(text);
        if !topics.is_empty() {
            return topics;
        }
        self.noun_phrases.extract(text)
    }
}

//=========================================================================================
// `TopicExtractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TopicExtractionService for TopicExtractionPipeline {
    /// Extracts an ordered, de-duplicated topic list from the text.
    async fn extract_topics(&self, text: &str) -> PortResult<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match self.llm_topics(text).await {
            Ok(topics) => Ok(topics),
            // No backend or an empty read: the deterministic strategies still
            // get a chance before the caller sees the failure.
            Err(e @ (PortError::NotConfigured(_) | PortError::NoTopics)) => {
                warn!(error = %e, "LLM topic extraction unavailable, trying deterministic strategies");
                let topics = self.fallback_topics(text);
                if topics.is_empty() {
                    Err(e)
                } else {
                    Ok(topics)
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedCompletion {
        reply: PortResult<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionService for CannedCompletion {
        async fn complete(&self, prompt: &str) -> PortResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn pipeline(reply: PortResult<String>) -> (Arc<CannedCompletion>, TopicExtractionPipeline) {
        let completion = Arc::new(CannedCompletion {
            reply,
            prompts: Mutex::new(Vec::new()),
        });
        let pipeline = TopicExtractionPipeline::new(completion.clone());
        (completion, pipeline)
    }

    #[tokio::test]
    async fn splits_reply_lines_into_topics() {
        let (_, pipeline) = pipeline(Ok("Sorting\n\n  Graph Theory  \nRecursion\n".to_string()));
        let topics = pipeline.extract_topics("some syllabus text").await.unwrap();
        assert_eq!(topics, vec!["Sorting", "Graph Theory", "Recursion"]);
    }

    #[tokio::test]
    async fn bounds_the_prompt_snippet() {
        let (completion, pipeline) = pipeline(Ok("Topic".to_string()));
        let long_text = "x".repeat(10_000);
        pipeline.extract_topics(&long_text).await.unwrap();
        let prompt = completion.prompts.lock().unwrap()[0].clone();
        // Template overhead plus at most SNIPPET_LIMIT characters of text.
        assert!(prompt.len() < SNIPPET_LIMIT + TOPIC_PROMPT_TEMPLATE.len());
    }

    #[tokio::test]
    async fn whitespace_input_yields_empty_list_without_a_call() {
        let (completion, pipeline) = pipeline(Ok("unused".to_string()));
        let topics = pipeline.extract_topics("   \n ").await.unwrap();
        assert!(topics.is_empty());
        assert!(completion.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_backend_falls_back_to_heading_rules() {
        let (_, pipeline) = pipeline(Err(PortError::NotConfigured("LLM_API_KEY")));
        let text = "Unit 1: Sorting Algorithms\nUnit 2: Graph Traversal\n";
        let topics = pipeline.extract_topics(text).await.unwrap();
        assert_eq!(topics, vec!["Sorting Algorithms", "Graph Traversal"]);
    }

    #[tokio::test]
    async fn blank_reply_falls_back_to_noun_phrases() {
        let (_, pipeline) = pipeline(Ok("\n\n".to_string()));
        let topics = pipeline
            .extract_topics("binary search trees are rebalanced on each insertion")
            .await
            .unwrap();
        assert!(topics.iter().any(|t| t.contains("binary search trees")));
    }

    #[tokio::test]
    async fn unstructured_text_preserves_the_original_error() {
        let (_, pipeline) = pipeline(Err(PortError::NotConfigured("LLM_API_KEY")));
        assert!(matches!(
            pipeline.extract_topics("of the and or").await,
            Err(PortError::NotConfigured("LLM_API_KEY"))
        ));
    }

    #[tokio::test]
    async fn upstream_failures_are_not_masked_by_fallbacks() {
        let (_, pipeline) = pipeline(Err(PortError::Upstream("rate limited".to_string())));
        assert!(matches!(
            pipeline.extract_topics("Unit 1: Sorting").await,
            Err(PortError::Upstream(_))
        ));
    }
}
