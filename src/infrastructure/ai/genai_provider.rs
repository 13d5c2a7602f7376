//! Chat provider adapter over the `genai` client
//!
//! One adapter covers every provider the `genai` crate speaks; the model
//! list doubles as a fallback chain, so a preview model failing mid-release
//! degrades to a stable one instead of failing the request.

use crate::domains::ai::{
    errors::AiDomainError,
    repository::AiProviderPort,
    value_objects::{AiProviderKind, ChatPrompt},
};
use crate::redaction;
use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatRequest};
use genai::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// `genai`-backed implementation of the provider port
pub struct GenaiProvider {
    client: Client,
    kind: AiProviderKind,
    models: Vec<String>,
}

impl GenaiProvider {
    /// Validates the API key shape up front and hands it to the client via
    /// the provider's environment variable. The key never appears in any
    /// error this constructor returns.
    pub fn new(
        kind: AiProviderKind,
        api_key: &str,
        models: Vec<String>,
    ) -> Result<Self, AiDomainError> {
        kind.validate_api_key(api_key)?;

        let env_var = match kind {
            AiProviderKind::Gemini => "GEMINI_API_KEY",
            AiProviderKind::OpenAi => "OPENAI_API_KEY",
            AiProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        };
        std::env::set_var(env_var, api_key);

        if models.is_empty() {
            return Err(AiDomainError::NotConfigured);
        }

        Ok(Self {
            client: Client::default(),
            kind,
            models,
        })
    }

    /// Gemini with the default model fallback chain
    pub fn gemini(api_key: &str) -> Result<Self, AiDomainError> {
        Self::new(
            AiProviderKind::Gemini,
            api_key,
            vec![
                "gemini-2.0-flash".to_string(),
                "gemini-1.5-flash".to_string(),
            ],
        )
    }

    async fn call_model(&self, model: &str, prompt: &ChatPrompt) -> Result<String, AiDomainError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(prompt.system.clone()),
            ChatMessage::user(prompt.user.clone()),
        ]);

        let response = self
            .client
            .exec_chat(model, request, None)
            .await
            .map_err(|e| AiDomainError::Transport {
                message: redaction::redact(&e.to_string()),
            })?;

        response
            .content_text_as_str()
            .map(str::to_string)
            .ok_or_else(|| AiDomainError::InvalidResponse {
                reason: "response carried no text content".to_string(),
            })
    }
}

#[async_trait]
impl AiProviderPort for GenaiProvider {
    fn name(&self) -> &str {
        self.kind.display_name()
    }

    async fn complete(
        &self,
        prompt: &ChatPrompt,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        let mut last_error = AiDomainError::NotConfigured;
        for model in &self.models {
            if cancel.is_cancelled() {
                return Err(AiDomainError::Cancelled);
            }
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(AiDomainError::Cancelled),
                outcome = self.call_model(model, prompt) => outcome,
            };
            match outcome {
                Ok(text) => return Ok(text),
                Err(error) => {
                    debug!(model = model.as_str(), "model attempt failed: {}", error);
                    last_error = error;
                }
            }
        }
        Err(last_error)
    }
}
