//! Resilient AI generation service
//!
//! Wraps any provider with rate limiting, bounded retries, per-attempt
//! timeouts, and secret redaction of every outbound error message.

use crate::domains::ai::{
    errors::AiDomainError,
    rate_limiter::RateLimiter,
    repository::{AiProviderPort, AiServicePort},
    value_objects::{AiCommitClassification, AiSettings, ChatPrompt, GenerationRequest, PromptLibrary},
};
use crate::redaction;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const INITIAL_BACKOFF: Duration = Duration::from_millis(200);

/// Rate-limited, retrying wrapper around a chat provider
pub struct ResilientAiService {
    provider: Arc<dyn AiProviderPort>,
    limiter: RateLimiter,
    settings: AiSettings,
    prompts: PromptLibrary,
}

impl ResilientAiService {
    pub fn new(provider: Arc<dyn AiProviderPort>, settings: AiSettings) -> Self {
        Self {
            provider,
            limiter: RateLimiter::per_minute(settings.requests_per_minute),
            settings,
            prompts: PromptLibrary::new(),
        }
    }

    /// Runs one prompt through the limiter, retry, and timeout stack
    async fn execute(
        &self,
        prompt: ChatPrompt,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        let attempts = self.settings.max_attempts.max(1);
        let mut backoff = INITIAL_BACKOFF;

        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                return Err(AiDomainError::Cancelled);
            }
            self.limiter.wait(cancel).await?;

            let outcome = tokio::time::timeout(
                self.settings.request_timeout,
                self.provider.complete(&prompt, cancel),
            )
            .await;

            let error = match outcome {
                Ok(Ok(text)) => return Ok(text),
                Ok(Err(error)) => error,
                Err(_) => AiDomainError::Timeout {
                    seconds: self.settings.request_timeout.as_secs(),
                },
            };

            let error = sanitize(error);
            if !error.is_retriable() || attempt == attempts {
                return Err(error);
            }

            debug!(
                provider = self.provider.name(),
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                "retrying AI request: {}",
                error
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(AiDomainError::Cancelled),
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(self.settings.request_timeout);
        }

        Err(AiDomainError::Provider {
            message: "retries exhausted".to_string(),
            retriable: false,
        })
    }

    async fn generate(
        &self,
        prompt: Result<ChatPrompt, AiDomainError>,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        let text = self.execute(prompt?, cancel).await?;
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl AiServicePort for ResilientAiService {
    async fn generate_changelog(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        self.generate(self.prompts.changelog(request), cancel).await
    }

    async fn generate_release_notes(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        self.generate(self.prompts.release_notes(request), cancel).await
    }

    async fn generate_marketing_blurb(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        self.generate(self.prompts.marketing(request), cancel).await
    }

    async fn summarize_changes(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        self.generate(self.prompts.summary(request), cancel).await
    }

    async fn classify_commit(
        &self,
        message: &str,
        diff: &str,
        cancel: &CancellationToken,
    ) -> Result<AiCommitClassification, AiDomainError> {
        let prompt = self.prompts.classify(message, diff)?;
        let response = self.execute(prompt, cancel).await?;
        parse_classification(&response)
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Service used when no provider is configured.
///
/// Generation returns empty text and `is_available` is false, which callers
/// treat as "skip AI, use deterministic generation".
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAiService;

#[async_trait]
impl AiServicePort for NoopAiService {
    async fn generate_changelog(
        &self,
        _request: &GenerationRequest,
        _cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        Ok(String::new())
    }

    async fn generate_release_notes(
        &self,
        _request: &GenerationRequest,
        _cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        Ok(String::new())
    }

    async fn generate_marketing_blurb(
        &self,
        _request: &GenerationRequest,
        _cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        Ok(String::new())
    }

    async fn summarize_changes(
        &self,
        _request: &GenerationRequest,
        _cancel: &CancellationToken,
    ) -> Result<String, AiDomainError> {
        Ok(String::new())
    }

    async fn classify_commit(
        &self,
        _message: &str,
        _diff: &str,
        _cancel: &CancellationToken,
    ) -> Result<AiCommitClassification, AiDomainError> {
        Err(AiDomainError::NotConfigured)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Rewrites error text through the redactor before it can reach any surface
fn sanitize(error: AiDomainError) -> AiDomainError {
    match error {
        AiDomainError::Transport { message } => AiDomainError::Transport {
            message: redaction::redact(&message),
        },
        AiDomainError::Provider { message, retriable } => AiDomainError::Provider {
            message: redaction::redact(&message),
            retriable,
        },
        AiDomainError::InvalidResponse { reason } => AiDomainError::InvalidResponse {
            reason: redaction::redact(&reason),
        },
        other => other,
    }
}

/// Parses the provider's classification JSON, tolerating fenced responses
fn parse_classification(response: &str) -> Result<AiCommitClassification, AiDomainError> {
    let payload = extract_json_block(response);
    serde_json::from_str(&payload).map_err(|e| {
        warn!("unparseable classification response: {}", e);
        AiDomainError::InvalidResponse {
            reason: redaction::redact(&format!("classification JSON did not parse: {}", e)),
        }
    })
}

/// Pulls the JSON object out of a response that may be wrapped in markdown
/// fences or surrounded by prose
fn extract_json_block(response: &str) -> String {
    let response = response.trim();

    for fence in ["```json", "```"] {
        if let Some(start) = response.find(fence) {
            let rest = &response[start + fence.len()..];
            if let Some(end) = rest.find("```") {
                return rest[..end].trim().to_string();
            }
        }
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if end > start {
            return response[start..=end].trim().to_string();
        }
    }

    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        calls: AtomicU32,
        failures_before_success: u32,
        error: fn() -> AiDomainError,
    }

    impl ScriptedProvider {
        fn failing_then_ok(failures: u32, error: fn() -> AiDomainError) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures_before_success: failures,
                error,
            }
        }
    }

    #[async_trait]
    impl AiProviderPort for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _prompt: &ChatPrompt,
            _cancel: &CancellationToken,
        ) -> Result<String, AiDomainError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err((self.error)())
            } else {
                Ok("generated text".to_string())
            }
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            repository_name: "acme".to_string(),
            version: "1.0.0".to_string(),
            previous_version: None,
            release_type: "minor".to_string(),
            tone_guidance: String::new(),
            audience_guidance: String::new(),
            changes: vec![],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transport_errors_until_success() {
        let provider = Arc::new(ScriptedProvider::failing_then_ok(2, || {
            AiDomainError::Transport {
                message: "connection reset".to_string(),
            }
        }));
        let service = ResilientAiService::new(provider.clone(), AiSettings::default());

        let text = service
            .generate_release_notes(&request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(text, "generated text");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn authentication_errors_are_not_retried() {
        let provider = Arc::new(ScriptedProvider::failing_then_ok(5, || {
            AiDomainError::Authentication {
                provider: "scripted".to_string(),
            }
        }));
        let service = ResilientAiService::new(provider.clone(), AiSettings::default());

        let result = service
            .generate_release_notes(&request(), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(AiDomainError::Authentication { .. })));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_are_bounded() {
        let provider = Arc::new(ScriptedProvider::failing_then_ok(100, || {
            AiDomainError::Provider {
                message: "overloaded".to_string(),
                retriable: true,
            }
        }));
        let settings = AiSettings {
            max_attempts: 3,
            ..Default::default()
        };
        let service = ResilientAiService::new(provider.clone(), settings);

        let result = service
            .generate_release_notes(&request(), &CancellationToken::new())
            .await;
        assert!(result.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_context_aborts_before_calling_the_provider() {
        let provider = Arc::new(ScriptedProvider::failing_then_ok(0, || {
            AiDomainError::NotConfigured
        }));
        let service = ResilientAiService::new(provider.clone(), AiSettings::default());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = service.generate_release_notes(&request(), &cancel).await;
        assert!(matches!(result, Err(AiDomainError::Cancelled)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_errors_are_redacted() {
        let provider = Arc::new(ScriptedProvider::failing_then_ok(5, || {
            AiDomainError::Provider {
                message: "denied for key sk-ant-REDACTED".to_string(),
                retriable: false,
            }
        }));
        let service = ResilientAiService::new(provider, AiSettings::default());

        let error = service
            .generate_release_notes(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        let message = error.to_string();
        assert!(!message.contains("sk-ant-abcdefghijklmnop"));
        assert!(message.contains("[REDACTED]"));
    }

    #[test]
    fn json_extraction_handles_fences_and_prose() {
        assert_eq!(
            extract_json_block("```json\n{\"a\":1}\n```"),
            "{\"a\":1}"
        );
        assert_eq!(extract_json_block("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(
            extract_json_block("Here you go: {\"a\":1} hope it helps"),
            "{\"a\":1}"
        );
        assert_eq!(extract_json_block("plain text"), "plain text");
    }

    #[test]
    fn classification_parses_from_fenced_response() {
        let parsed = parse_classification(
            "```json\n{\"commitType\":\"fix\",\"isBreaking\":false,\"confidence\":0.8}\n```",
        )
        .unwrap();
        assert_eq!(parsed.commit_type, "fix");
    }

    #[tokio::test]
    async fn noop_service_reports_unavailable_and_empty_text() {
        let service = NoopAiService;
        assert!(!service.is_available());
        let text = service
            .generate_release_notes(&request(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(text.is_empty());
        assert!(matches!(
            service
                .classify_commit("msg", "diff", &CancellationToken::new())
                .await,
            Err(AiDomainError::NotConfigured)
        ));
    }
}
