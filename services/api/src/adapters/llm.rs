//! services/api/src/adapters/llm.rs
//!
//! This module contains the adapter for the raw text-completion backend.
//! It implements the `CompletionService` port from the `core` crate against
//! any OpenAI-compatible chat completions API (Groq in production).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use studyaid_core::ports::{CompletionService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
///
/// Without an API key the adapter still constructs; every call then reports
/// `NotConfigured` so only the LLM-backed features degrade, not the process.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`. The client is built only
    /// when an API key is present.
    pub fn new(api_key: Option<&str>, api_base: &str, model: String) -> Self {
        let client = api_key.map(|key| {
            let config = OpenAIConfig::new()
                .with_api_key(key)
                .with_api_base(api_base);
            Client::with_config(config)
        });
        Self { client, model }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    /// Sends one stateless user message and returns the reply text.
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        let client = self
            .client
            .as_ref()
            .ok_or(PortError::NotConfigured("LLM_API_KEY"))?;

        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Upstream(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::EmptyResponse)
            }
        } else {
            Err(PortError::EmptyResponse)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_fails_at_call_time_not_construction() {
        let adapter = OpenAiCompletionAdapter::new(None, "http://localhost", "model".to_string());
        assert!(matches!(
            adapter.complete("prompt").await,
            Err(PortError::NotConfigured("LLM_API_KEY"))
        ));
    }
}
