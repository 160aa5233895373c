//! services/api/src/web/protocol.rs
//!
//! Defines the JSON request and response payloads exchanged between the
//! browser client and the API server.

use serde::{Deserialize, Serialize};
use studyaid_core::domain::{Resource, StructuredContent};
use studyaid_core::quiz::QuizProgress;
use utoipa::ToSchema;
use uuid::Uuid;

/// The response to a document upload.
///
/// Failures are degraded-but-valid: `error` carries an inline message while
/// the rest of the payload stays renderable.
#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(value_type = Option<String>)]
    pub session_id: Option<Uuid>,
    pub topics: Vec<String>,
    pub concept_map_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One entry in a resource list: either a found resource or an inline
/// error explaining why that backend produced nothing.
#[derive(Serialize)]
#[serde(untagged)]
pub enum ResourceEntry {
    Found(Resource),
    Failed { error: String },
}

/// The detail payload for a single topic.
#[derive(Serialize)]
pub struct TopicDetailsResponse {
    pub topic: String,
    pub explanation_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_error: Option<String>,
    pub resources: Vec<ResourceEntry>,
}

#[derive(Serialize)]
pub struct FlashcardsResponse {
    pub topic: String,
    #[serde(flatten)]
    pub content: StructuredContent,
}

#[derive(Deserialize, ToSchema)]
pub struct StartQuizRequest {
    pub topic: String,
    pub count: Option<usize>,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// The quiz view after starting, answering, or asking for results.
#[derive(Serialize)]
pub struct QuizStateResponse {
    pub topic: String,
    /// Whether the just-submitted answer was correct; absent on start and
    /// results requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(flatten)]
    pub progress: QuizProgress,
}
