//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use studyaid_core::domain::{DocumentKind, StructuredContent, UploadedDocument};
use studyaid_core::ports::PortError;
use studyaid_core::quiz::QuizSession;
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::web::protocol::{
    AnswerRequest, FlashcardsResponse, QuizStateResponse, StartQuizRequest,
    TopicDetailsResponse, UploadResponse,
};
use crate::web::resource_task::find_resources;
use crate::web::state::AppState;

const DEFAULT_QUIZ_QUESTIONS: usize = 5;
const DEFAULT_FLASHCARDS: usize = 5;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_document_handler,
    ),
    components(
        schemas(UploadResponse, StartQuizRequest)
    ),
    tags(
        (name = "Study Aid API", description = "API endpoints for the syllabus study aid.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Converts a port failure into a user-facing HTTP response. Nothing here is
/// fatal; the message is always renderable by the client.
fn port_error_response(e: PortError) -> (StatusCode, String) {
    let status = match &e {
        PortError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        PortError::Upstream(_) | PortError::EmptyResponse | PortError::Malformed(_) => {
            StatusCode::BAD_GATEWAY
        }
        PortError::NoTopics => StatusCode::UNPROCESSABLE_ENTITY,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

//=========================================================================================
// Document Upload
//=========================================================================================

fn document_kind(file_name: &str, content_type: Option<&str>) -> Option<DocumentKind> {
    if let Some(ct) = content_type {
        if ct == "application/pdf" {
            return Some(DocumentKind::Pdf);
        }
        if ct.starts_with("image/") {
            return Some(DocumentKind::Image);
        }
    }
    let lower = file_name.to_lowercase();
    if lower.ends_with(".pdf") {
        Some(DocumentKind::Pdf)
    } else if [".png", ".jpg", ".jpeg", ".bmp", ".webp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
    {
        Some(DocumentKind::Image)
    } else {
        None
    }
}

/// Upload a syllabus and start a study session.
///
/// Accepts a multipart/form-data request with a single PDF or image part.
/// Extracts the document text, derives the topic list, and generates the
/// concept map. Extraction failures come back as a degraded 200 with an
/// inline error so the client can re-render the upload page with a banner.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The syllabus to upload."),
    responses(
        (status = 200, description = "Session created (or a degraded response with an inline error)", body = UploadResponse),
        (status = 400, description = "Bad request (e.g., missing file or unsupported type)")
    )
)]
pub async fn upload_document_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;

    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(str::to_string);
    let kind = document_kind(&file_name, content_type.as_deref()).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Only PDF and image uploads are supported".to_string(),
        )
    })?;
    let bytes = field.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;

    let document = UploadedDocument {
        kind,
        bytes: bytes.to_vec(),
    };

    // The document is dropped as soon as text extraction finishes; only the
    // topic list survives, inside the session.
    let text = match state.extractor.extract_text(&document).await {
        Ok(text) => text,
        Err(e) => {
            error!("text extraction failed: {}", e);
            return Ok(Json(degraded_upload(format!(
                "Could not read the uploaded file: {}",
                e
            ))));
        }
    };
    drop(document);

    let topics = match state.topics.extract_topics(&text).await {
        Ok(topics) if !topics.is_empty() => topics,
        Ok(_) | Err(PortError::NoTopics) => {
            return Ok(Json(degraded_upload(
                "Could not extract topics from the document.".to_string(),
            )));
        }
        Err(e) => {
            error!("topic extraction failed: {}", e);
            return Ok(Json(degraded_upload(format!(
                "Could not extract topics: {}",
                e
            ))));
        }
    };

    // The concept map is best-effort: a failure keeps the topic list usable.
    let concept_map_html = match state.content.concept_map(&topics).await {
        Ok(html) => Some(html),
        Err(e) => {
            warn!("concept map generation failed: {}", e);
            None
        }
    };

    let session_id = state.sessions.create(topics.clone(), concept_map_html.clone()).await;
    Ok(Json(UploadResponse {
        session_id: Some(session_id),
        topics,
        concept_map_html,
        error: None,
    }))
}

fn degraded_upload(error: String) -> UploadResponse {
    UploadResponse {
        session_id: None,
        topics: Vec::new(),
        concept_map_html: None,
        error: Some(error),
    }
}

//=========================================================================================
// Topic Details and Flashcards
//=========================================================================================

/// Explanation plus external resources for one topic.
pub async fn topic_details_handler(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Json<TopicDetailsResponse> {
    let (explanation_html, explanation_error) = match state.content.explanation(&topic).await {
        Ok(html) => (Some(html), None),
        Err(e) => (None, Some(e.to_string())),
    };

    let resources =
        find_resources(&state.keywords, &state.videos, &state.articles, &topic).await;

    Json(TopicDetailsResponse {
        topic,
        explanation_html,
        explanation_error,
        resources,
    })
}

#[derive(Deserialize)]
pub struct CountQuery {
    count: Option<usize>,
}

/// Flashcards for one topic.
pub async fn flashcards_handler(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Query(query): Query<CountQuery>,
) -> Result<Json<FlashcardsResponse>, (StatusCode, String)> {
    let count = query.count.unwrap_or(DEFAULT_FLASHCARDS);
    let cards = state
        .content
        .flashcards(&topic, count)
        .await
        .map_err(port_error_response)?;
    Ok(Json(FlashcardsResponse {
        topic,
        content: StructuredContent::Flashcards { cards },
    }))
}

//=========================================================================================
// Quiz Flow
//=========================================================================================

fn session_not_found() -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        "Unknown or expired session".to_string(),
    )
}

/// Generate a quiz and attach it to the session, replacing any prior attempt.
pub async fn start_quiz_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<StartQuizRequest>,
) -> Result<Json<QuizStateResponse>, (StatusCode, String)> {
    // Reject unknown sessions before the generation call.
    state
        .sessions
        .with_session(session_id, |_| ())
        .await
        .ok_or_else(session_not_found)?;

    let count = request.count.unwrap_or(DEFAULT_QUIZ_QUESTIONS);
    let questions = state
        .content
        .quiz(&request.topic, count)
        .await
        .map_err(port_error_response)?;

    let quiz = QuizSession::new(request.topic.clone(), questions);
    let progress = quiz.progress();
    state
        .sessions
        .with_session(session_id, |session| {
            session.quiz = Some(quiz);
        })
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(QuizStateResponse {
        topic: request.topic,
        correct: None,
        progress,
    }))
}

/// Score an answer against the session's current question and advance.
pub async fn submit_answer_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<QuizStateResponse>, (StatusCode, String)> {
    let outcome = state
        .sessions
        .with_session(session_id, |session| {
            session.quiz.as_mut().map(|quiz| {
                let correct = quiz.submit(&request.answer);
                (quiz.topic().to_string(), correct, quiz.progress())
            })
        })
        .await
        .ok_or_else(session_not_found)?;

    let (topic, correct, progress) = outcome.ok_or_else(|| {
        (
            StatusCode::CONFLICT,
            "No quiz has been started for this session".to_string(),
        )
    })?;

    Ok(Json(QuizStateResponse {
        topic,
        correct,
        progress,
    }))
}

/// The current quiz standing: the open question or the final results.
pub async fn quiz_results_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<QuizStateResponse>, (StatusCode, String)> {
    let outcome = state
        .sessions
        .with_session(session_id, |session| {
            session
                .quiz
                .as_ref()
                .map(|quiz| (quiz.topic().to_string(), quiz.progress()))
        })
        .await
        .ok_or_else(session_not_found)?;

    let (topic, progress) = outcome.ok_or_else(|| {
        (
            StatusCode::CONFLICT,
            "No quiz has been started for this session".to_string(),
        )
    })?;

    Ok(Json(QuizStateResponse {
        topic,
        correct: None,
        progress,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_kind_prefers_the_content_type() {
        assert_eq!(
            document_kind("syllabus.bin", Some("application/pdf")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            document_kind("scan", Some("image/png")),
            Some(DocumentKind::Image)
        );
    }

    #[test]
    fn document_kind_falls_back_to_the_extension() {
        assert_eq!(document_kind("syllabus.PDF", None), Some(DocumentKind::Pdf));
        assert_eq!(document_kind("scan.jpeg", None), Some(DocumentKind::Image));
        assert_eq!(document_kind("notes.docx", None), None);
    }

    #[test]
    fn port_errors_map_to_user_facing_statuses() {
        let (status, _) = port_error_response(PortError::NotConfigured("LLM_API_KEY"));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let (status, _) = port_error_response(PortError::EmptyResponse);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let (status, message) = port_error_response(PortError::NoTopics);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!message.is_empty());
    }
}
