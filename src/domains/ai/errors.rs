//! AI domain error types

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by AI providers and the resilience layer around them
#[derive(Error, Diagnostic, Debug)]
pub enum AiDomainError {
    #[error("no AI provider configured")]
    #[diagnostic(
        code(ai::not_configured),
        help("Configure a provider and API key, or rely on deterministic generation")
    )]
    NotConfigured,

    #[error("API key rejected for provider {provider}")]
    #[diagnostic(
        code(ai::invalid_api_key),
        help("The key does not match the provider's expected format")
    )]
    InvalidApiKey { provider: String },

    #[error("authentication failed for provider {provider}")]
    #[diagnostic(code(ai::authentication_failed))]
    Authentication { provider: String },

    #[error("transport error: {message}")]
    #[diagnostic(code(ai::transport_error))]
    Transport { message: String },

    #[error("request timed out after {seconds}s")]
    #[diagnostic(code(ai::timeout))]
    Timeout { seconds: u64 },

    #[error("provider error: {message}")]
    #[diagnostic(code(ai::provider_error))]
    Provider { message: String, retriable: bool },

    #[error("unusable provider response: {reason}")]
    #[diagnostic(code(ai::invalid_response))]
    InvalidResponse { reason: String },

    #[error("prompt template failed to render: {message}")]
    #[diagnostic(code(ai::template_render))]
    TemplateRender { message: String },

    #[error("operation cancelled")]
    #[diagnostic(code(ai::cancelled))]
    Cancelled,
}

impl AiDomainError {
    /// Whether another attempt can reasonably succeed.
    /// Authentication failures never retry.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::Provider { retriable, .. } => *retriable,
            _ => false,
        }
    }
}
