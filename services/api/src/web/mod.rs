pub mod protocol;
pub mod resource_task;
pub mod rest;
pub mod state;

// Re-export the handlers the binary needs to build the web server router.
pub use rest::{
    flashcards_handler, quiz_results_handler, start_quiz_handler, submit_answer_handler,
    topic_details_handler, upload_document_handler,
};
