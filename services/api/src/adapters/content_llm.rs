//! services/api/src/adapters/content_llm.rs
//!
//! This module contains the adapter for the per-topic study content
//! generators. It implements the `ContentGenerationService` port: each method
//! builds one deterministic prompt, issues a single completion, and either
//! recovers a JSON payload (quiz, flashcards) or renders Markdown to HTML
//! (explanation, concept map). No retries happen here; the first failure is
//! returned to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use pulldown_cmark::{html, Parser};
use studyaid_core::domain::{Flashcard, Question};
use studyaid_core::ports::{CompletionService, ContentGenerationService, PortResult};
use studyaid_core::recovery::{parse_flashcards, parse_quiz};

const EXPLANATION_PROMPT: &str = r#"You are an expert academic tutor. Your task is to explain the following topic clearly and concisely, focusing on the key points that are most important for an exam.

RULES:
1. Start with a brief, one-sentence definition of the topic.
2. List 3-4 of the most critical sub-points or concepts as bullet points.
3. End with a short summary of why this topic is important.
4. The entire explanation should be under 150 words.

Topic: "{topic}""#;

const QUIZ_PROMPT: &str = r#"You are an expert at creating engaging and effective study quizzes for university students.
Generate a {count}-question quiz on the topic: "{topic}".

RULES:
1. Create a mix of question types: multiple-choice, true/false, and fill-in-the-blank.
2. Your response must be ONLY a valid JSON object. Do not include any text, explanation, or markdown.
3. The JSON object must have a single key "quiz", which is an array of question objects.
4. Each question object must have:
   - "type": "multiple-choice", "true-false", or "fill-in-the-blank".
   - "question": The question text. For fill-in-the-blank, use "____" for the blank space.
   - "options": An array of strings for multiple-choice, or ["True", "False"] for true/false. Leave this empty for fill-in-the-blank.
   - "answer": The correct answer string."#;

const FLASHCARD_PROMPT: &str = r#"You are an expert at creating study materials. Generate {count} flashcards for the topic: "{topic}".

RULES:
1. Your response must be ONLY a valid JSON object.
2. The JSON object must have a single key "flashcards", which is an array of card objects.
3. Each card object must have two keys: "front" (the question or term) and "back" (the answer or definition).
4. The questions should be concise and perfect for a flashcard format."#;

const CONCEPT_MAP_PROMPT: &str = r#"You are a university professor and an expert in curriculum design.
Analyze the following list of topics from a course syllabus and generate a "big picture" overview.

Your task is to explain the narrative of the course. Describe how the topics connect and build upon one another. Identify foundational concepts and explain why they are important for later, more advanced topics.

RULES:
1. Structure your response in clear, easy-to-read Markdown.
2. Start with a brief summary of the course's overall journey.
3. Use bold text to highlight key topic names when you mention them.
4. Keep the entire analysis concise, under 250 words.

Course Topics:
- {topics}"#;

/// Converts a Markdown reply into HTML for display.
fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ContentGenerationService` through the LLM.
pub struct LlmContentAdapter {
    completion: Arc<dyn CompletionService>,
}

impl LlmContentAdapter {
    /// Creates a new `LlmContentAdapter`.
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }
}

//=========================================================================================
// `ContentGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentGenerationService for LlmContentAdapter {
    /// An exam-focused explanation of one topic, rendered to HTML.
    async fn explanation(&self, topic: &str) -> PortResult<String> {
        let prompt = EXPLANATION_PROMPT.replace("{topic}", topic);
        let reply = self.completion.complete(&prompt).await?;
        Ok(render_markdown(&reply))
    }

    /// A quiz of `count` questions, recovered from the reply's JSON payload.
    async fn quiz(&self, topic: &str, count: usize) -> PortResult<Vec<Question>> {
        let prompt = QUIZ_PROMPT
            .replace("{count}", &count.to_string())
            .replace("{topic}", topic);
        let reply = self.completion.complete(&prompt).await?;
        Ok(parse_quiz(&reply)?)
    }

    /// A set of `count` flashcards, recovered from the reply's JSON payload.
    async fn flashcards(&self, topic: &str, count: usize) -> PortResult<Vec<Flashcard>> {
        let prompt = FLASHCARD_PROMPT
            .replace("{count}", &count.to_string())
            .replace("{topic}", topic);
        let reply = self.completion.complete(&prompt).await?;
        Ok(parse_flashcards(&reply)?)
    }

    /// A "big picture" overview of how the topics relate, rendered to HTML.
    async fn concept_map(&self, topics: &[String]) -> PortResult<String> {
        let prompt = CONCEPT_MAP_PROMPT.replace("{topics}", &topics.join("\n- "));
        let reply = self.completion.complete(&prompt).await?;
        Ok(render_markdown(&reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyaid_core::ports::PortError;

    struct CannedCompletion(String);

    #[async_trait]
    impl CompletionService for CannedCompletion {
        async fn complete(&self, _prompt: &str) -> PortResult<String> {
            Ok(self.0.clone())
        }
    }

    fn adapter(reply: &str) -> LlmContentAdapter {
        LlmContentAdapter::new(Arc::new(CannedCompletion(reply.to_string())))
    }

    #[tokio::test]
    async fn explanation_renders_markdown_to_html() {
        let html = adapter("**Recursion** is self-reference.")
            .explanation("Recursion")
            .await
            .unwrap();
        assert!(html.contains("<strong>Recursion</strong>"));
    }

    #[tokio::test]
    async fn quiz_recovers_json_wrapped_in_prose() {
        let reply = r#"Sure! Here is your quiz: {"quiz":[{"type":"true-false","question":"BFS is depth-first.","options":["True","False"],"answer":"False"}]} Hope it helps."#;
        let questions = adapter(reply).quiz("Graphs", 1).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, "False");
    }

    #[tokio::test]
    async fn empty_reply_surfaces_as_empty_response() {
        let result = adapter("   ").flashcards("Graphs", 5).await;
        assert!(matches!(result, Err(PortError::EmptyResponse)));
    }

    #[tokio::test]
    async fn malformed_reply_surfaces_as_malformed() {
        let result = adapter("I cannot produce JSON today.").quiz("Graphs", 5).await;
        assert!(matches!(result, Err(PortError::Malformed(_))));
    }
}
