//! AI domain ports

use crate::domains::ai::{
    errors::AiDomainError,
    value_objects::{AiCommitClassification, ChatPrompt, GenerationRequest},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Low-level chat completion port implemented per provider
#[async_trait]
pub trait AiProviderPort: Send + Sync {
    fn name(&self) -> &str;

    /// Sends one prompt and returns the raw text response
    async fn complete(
        &self,
        prompt: &ChatPrompt,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError>;
}

/// High-level generation port the rest of the engine consumes.
///
/// When `is_available` returns false every generation call is pointless;
/// callers fall through to deterministic generation instead.
#[async_trait]
pub trait AiServicePort: Send + Sync {
    async fn generate_changelog(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError>;

    async fn generate_release_notes(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError>;

    async fn generate_marketing_blurb(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError>;

    async fn summarize_changes(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError>;

    /// Structured classification of one commit from its message and diff
    async fn classify_commit(
        &self,
        message: &str,
        diff: &str,
        cancel: &CancellationToken,
    ) -> Result<AiCommitClassification, AiDomainError>;

    fn is_available(&self) -> bool;
}
