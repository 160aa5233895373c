//! crates/studyaid_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like LLM or search APIs.

use async_trait::async_trait;

use crate::domain::{Flashcard, Question, UploadedDocument};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Every variant is recoverable: failures are surfaced to the caller as a
/// user-facing message and never terminate the process.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    /// A required API key or model file is absent; the dependent call was
    /// never attempted.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    /// The upstream backend returned an HTTP or transport-level failure.
    #[error("Upstream service error: {0}")]
    Upstream(String),
    /// The upstream backend answered with an empty body where content was
    /// expected. Kept distinct from `Malformed` so callers can give a
    /// targeted retry message.
    #[error("The upstream service returned an empty response")]
    EmptyResponse,
    /// The upstream reply could not be parsed into the expected shape.
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
    /// No topics could be recovered from the document text.
    #[error("No distinct topics were found in the document")]
    NoTopics,
    /// A catch-all for anything else.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Search Result Records
//=========================================================================================

/// One hit from the video search backend.
#[derive(Debug, Clone)]
pub struct VideoHit {
    pub title: String,
    pub video_id: String,
}

/// One hit from the web search backend.
#[derive(Debug, Clone)]
pub struct ArticleHit {
    pub title: String,
    pub link: String,
}

/// One recognized region of text from the OCR backend. Consumers use only
/// the text field, joined with single spaces in detection order.
#[derive(Debug, Clone)]
pub struct OcrLine {
    pub text: String,
    pub confidence: f32,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A single stateless text completion. Each call carries exactly one user
/// message; there is no streaming and no multi-turn context.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> PortResult<String>;
}

/// Extracts an ordered, de-duplicated topic list from document text.
#[async_trait]
pub trait TopicExtractionService: Send + Sync {
    async fn extract_topics(&self, text: &str) -> PortResult<Vec<String>>;
}

/// Generates the per-topic study artifacts. Implementations build one prompt
/// per call and perform no internal retries.
#[async_trait]
pub trait ContentGenerationService: Send + Sync {
    /// A short exam-focused explanation, rendered to HTML.
    async fn explanation(&self, topic: &str) -> PortResult<String>;

    /// A quiz of `count` questions mixing the three question kinds.
    async fn quiz(&self, topic: &str, count: usize) -> PortResult<Vec<Question>>;

    /// A set of `count` front/back flashcards.
    async fn flashcards(&self, topic: &str, count: usize) -> PortResult<Vec<Flashcard>>;

    /// A "big picture" overview of how the topics relate, rendered to HTML.
    async fn concept_map(&self, topics: &[String]) -> PortResult<String>;
}

/// Compresses a topic into 3-5 search keywords.
#[async_trait]
pub trait KeywordService: Send + Sync {
    async fn compress_keywords(&self, topic: &str) -> PortResult<String>;
}

/// Searches the video backend.
#[async_trait]
pub trait VideoSearchService: Send + Sync {
    async fn search_videos(&self, query: &str, max_results: u8) -> PortResult<Vec<VideoHit>>;
}

/// Searches the general web backend.
#[async_trait]
pub trait WebSearchService: Send + Sync {
    async fn search_articles(&self, query: &str, max_results: u8)
        -> PortResult<Vec<ArticleHit>>;
}

/// Recognizes text in an image.
#[async_trait]
pub trait OcrService: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> PortResult<Vec<OcrLine>>;
}

/// Turns an uploaded document into best-effort plain text.
#[async_trait]
pub trait TextExtractionService: Send + Sync {
    async fn extract_text(&self, document: &UploadedDocument) -> PortResult<String>;
}
