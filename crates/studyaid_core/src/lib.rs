pub mod domain;
pub mod ports;
pub mod quiz;
pub mod recovery;
pub mod topics;

pub use domain::{
    BadgeTier, DocumentKind, Flashcard, Question, QuestionKind, Resource, ResourceKind,
    StructuredContent, UploadedDocument,
};
pub use ports::{
    ArticleHit, CompletionService, ContentGenerationService, KeywordService, OcrLine, OcrService,
    PortError, PortResult, TextExtractionService, TopicExtractionService, VideoHit,
    VideoSearchService, WebSearchService,
};
pub use quiz::{QuizProgress, QuizSession};
pub use recovery::RecoveryError;
