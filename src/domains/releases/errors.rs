//! Release domain error types

use crate::domains::releases::value_objects::ReleaseState;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ReleaseDomainError {
    #[error("invalid release transition from {from} to {requested}")]
    #[diagnostic(
        code(releases::invalid_transition),
        help("Releases move Draft → Versioned → NotesGenerated → Approved → Publishing → Published; Published and Failed are terminal")
    )]
    InvalidTransition {
        from: ReleaseState,
        requested: String,
    },

    #[error("release is not ready for approval: {reason}")]
    #[diagnostic(code(releases::not_ready_for_approval))]
    NotReadyForApproval { reason: String },

    #[error("release not found: {id}")]
    #[diagnostic(code(releases::not_found))]
    NotFound { id: String },

    #[error("conflicting update for release {id}")]
    #[diagnostic(
        code(releases::conflict),
        help("Another writer saved this release first; reload and retry")
    )]
    Conflict { id: String },

    #[error("{message}")]
    #[diagnostic(code(releases::storage))]
    Storage { message: String },

    #[error("event publication failed: {message}")]
    #[diagnostic(code(releases::event_publish))]
    EventPublish { message: String },

    #[error("invalid run id: {id}")]
    #[diagnostic(
        code(releases::invalid_run_id),
        help("Run ids start with an alphanumeric, use only [A-Za-z0-9_-], and are at most 64 characters")
    )]
    InvalidRunId { id: String },

    #[error("invalid approver name")]
    #[diagnostic(
        code(releases::invalid_approver),
        help("Approver names are at most 256 characters and cannot contain control characters")
    )]
    InvalidApprover { reason: String },

    #[error("invalid publish URL: {reason}")]
    #[diagnostic(
        code(releases::invalid_publish_url),
        help("Publish URLs must be http(s) and at most 2048 characters")
    )]
    InvalidPublishUrl { reason: String },

    #[error("release notes exceed the {limit_bytes} byte limit")]
    #[diagnostic(code(releases::notes_too_large))]
    NotesTooLarge { limit_bytes: usize },
}

impl ReleaseDomainError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
