pub mod content_llm;
pub mod extract;
pub mod keyword_llm;
pub mod llm;
pub mod ocr;
pub mod topic_llm;
pub mod websearch;
pub mod youtube;

pub use content_llm::LlmContentAdapter;
pub use extract::TextExtractorAdapter;
pub use keyword_llm::LlmKeywordAdapter;
pub use llm::OpenAiCompletionAdapter;
pub use ocr::TrOcrAdapter;
pub use topic_llm::TopicExtractionPipeline;
pub use websearch::GoogleSearchAdapter;
pub use youtube::YouTubeSearchAdapter;
