//! Top-level error type for the release engine
//!
//! Each domain carries its own error enum; this module aggregates them behind
//! a single type that exposes the error's outward-facing kind, whether the
//! condition is recoverable, and the user-facing message formatting rules.

use miette::Diagnostic;
use thiserror::Error;

use crate::application::validation::ValidationError;
use crate::domains::ai::errors::AiDomainError;
use crate::domains::analysis::errors::AnalysisDomainError;
use crate::domains::git::errors::GitDomainError;
use crate::domains::plugins::errors::PluginDomainError;
use crate::domains::releases::errors::ReleaseDomainError;
use crate::domains::semantic::errors::SemanticDomainError;

/// Result type alias for the engine
pub type Result<T> = std::result::Result<T, ReleaseEngineError>;

/// Category of an error as reported outward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Git,
    Version,
    Plugin,
    Ai,
    Validation,
    NotFound,
    Io,
    Network,
    Timeout,
    Internal,
    State,
    Template,
    Conflict,
}

impl ErrorKind {
    /// Whether the caller can reasonably retry or correct the input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation | Self::Network | Self::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Git => "git",
            Self::Version => "version",
            Self::Plugin => "plugin",
            Self::Ai => "ai",
            Self::Validation => "validation",
            Self::NotFound => "not-found",
            Self::Io => "io",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
            Self::State => "state",
            Self::Template => "template",
            Self::Conflict => "conflict",
        }
    }
}

/// Engine-wide error aggregating all domain errors
#[derive(Error, Diagnostic, Debug)]
pub enum ReleaseEngineError {
    #[error("{0}")]
    #[diagnostic(transparent)]
    Git(#[from] GitDomainError),

    #[error("{0}")]
    #[diagnostic(transparent)]
    Semantic(#[from] SemanticDomainError),

    #[error("{0}")]
    #[diagnostic(transparent)]
    Analysis(#[from] AnalysisDomainError),

    #[error("{0}")]
    #[diagnostic(transparent)]
    Release(#[from] ReleaseDomainError),

    #[error("{0}")]
    #[diagnostic(transparent)]
    Ai(#[from] AiDomainError),

    #[error("{0}")]
    #[diagnostic(transparent)]
    Plugin(#[from] PluginDomainError),

    #[error("{0}")]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O operation failed")]
    #[diagnostic(
        code(release_engine::io_error),
        help("Check file permissions and disk space")
    )]
    Io(#[from] std::io::Error),

    #[error("serialization failed")]
    #[diagnostic(code(release_engine::serde_error))]
    Serde(#[from] serde_json::Error),

    #[error("internal error: {message}")]
    #[diagnostic(code(release_engine::internal_error))]
    Internal { message: String },
}

impl ReleaseEngineError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Maps the error onto its outward-facing kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Git(e) => match e {
                GitDomainError::InvalidRef { .. }
                | GitDomainError::InvalidBranchName { .. }
                | GitDomainError::InvalidTagName { .. }
                | GitDomainError::InvalidTagPrefix { .. }
                | GitDomainError::InvalidCommitHash { .. } => ErrorKind::Validation,
                GitDomainError::CommitNotFound { .. } | GitDomainError::TagNotFound { .. } => {
                    ErrorKind::NotFound
                }
                _ => ErrorKind::Git,
            },
            Self::Semantic(e) => match e {
                SemanticDomainError::InvalidVersion { .. } => ErrorKind::Version,
                SemanticDomainError::NoCommitsFound { .. } => ErrorKind::Validation,
                SemanticDomainError::EmptyChangeSet => ErrorKind::Validation,
            },
            Self::Analysis(_) => ErrorKind::Internal,
            Self::Release(e) => match e {
                ReleaseDomainError::InvalidTransition { .. } => ErrorKind::State,
                ReleaseDomainError::NotReadyForApproval { .. } => ErrorKind::State,
                ReleaseDomainError::NotFound { .. } => ErrorKind::NotFound,
                ReleaseDomainError::Conflict { .. } => ErrorKind::Conflict,
                ReleaseDomainError::Storage { .. } => ErrorKind::Io,
                ReleaseDomainError::EventPublish { .. } => ErrorKind::Internal,
                ReleaseDomainError::InvalidRunId { .. } => ErrorKind::Validation,
                ReleaseDomainError::InvalidApprover { .. } => ErrorKind::Validation,
                ReleaseDomainError::InvalidPublishUrl { .. } => ErrorKind::Validation,
                ReleaseDomainError::NotesTooLarge { .. } => ErrorKind::Validation,
            },
            Self::Ai(e) => match e {
                AiDomainError::Transport { .. } => ErrorKind::Network,
                AiDomainError::Timeout { .. } => ErrorKind::Timeout,
                AiDomainError::TemplateRender { .. } => ErrorKind::Template,
                _ => ErrorKind::Ai,
            },
            Self::Plugin(_) => ErrorKind::Plugin,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Io(_) => ErrorKind::Io,
            Self::Serde(_) => ErrorKind::Internal,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }
}

/// Formats an error for end users: the innermost non-redundant message,
/// capitalized, with " failed" appended exactly once.
///
/// `"plan" + "plan failed: failed to plan release: dirty tree"` renders as
/// `"Plan failed: dirty tree"`.
pub fn format_user_error(operation: &str, error: &ReleaseEngineError) -> String {
    let op_lower = operation.to_lowercase();
    let mut message = error.to_string();

    // Strip wrapping layers that restate the operation.
    loop {
        let lower = message.to_lowercase();
        let next = if lower.starts_with(&format!("{} failed: ", op_lower)) {
            message[op_lower.len() + " failed: ".len()..].to_string()
        } else if lower.starts_with(&format!("failed to {}", op_lower)) {
            let rest = &message["failed to ".len() + op_lower.len()..];
            match rest.find(": ") {
                Some(idx) => rest[idx + 2..].to_string(),
                None => rest.trim_start().to_string(),
            }
        } else {
            break;
        };
        if next.is_empty() || next == message {
            break;
        }
        message = next;
    }

    let mut operation_cased = operation.to_string();
    if let Some(first) = operation_cased.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!("{} failed: {}", operation_cased, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds() {
        assert!(ErrorKind::Validation.is_recoverable());
        assert!(ErrorKind::Network.is_recoverable());
        assert!(ErrorKind::Timeout.is_recoverable());
        assert!(!ErrorKind::Git.is_recoverable());
        assert!(!ErrorKind::State.is_recoverable());
    }

    #[test]
    fn user_message_collapses_redundant_wrapping() {
        let err = ReleaseEngineError::Release(ReleaseDomainError::Storage {
            message: "plan failed: failed to plan release: store unavailable".to_string(),
        });
        // The Storage variant renders its message verbatim, so the collapsing
        // logic sees the nested wrapping directly.
        let rendered = format_user_error("plan", &err);
        assert_eq!(rendered, "Plan failed: store unavailable");
    }

    #[test]
    fn user_message_appends_failed_once() {
        let err = ReleaseEngineError::Git(GitDomainError::WorkingTreeDirty);
        let rendered = format_user_error("plan", &err);
        assert!(rendered.starts_with("Plan failed: "));
        assert_eq!(rendered.matches("failed").count(), 1);
    }

    #[test]
    fn dirty_tree_reports_git_kind() {
        let err = ReleaseEngineError::Git(GitDomainError::WorkingTreeDirty);
        assert_eq!(err.kind(), ErrorKind::Git);
        assert!(err.to_string().contains("uncommitted"));
    }
}
