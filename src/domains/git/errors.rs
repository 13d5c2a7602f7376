//! Git domain error types

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by source-control operations and git value objects
#[derive(Error, Diagnostic, Debug)]
pub enum GitDomainError {
    #[error("working tree has uncommitted changes")]
    #[diagnostic(
        code(git::dirty_working_tree),
        help("Commit or stash your changes, or run with dry-run enabled")
    )]
    WorkingTreeDirty,

    #[error("invalid git reference: {reference}")]
    #[diagnostic(
        code(git::invalid_ref),
        help("References cannot contain ':', '?', '*', '[', '\\' or whitespace")
    )]
    InvalidRef { reference: String },

    #[error("invalid branch name: {name}")]
    #[diagnostic(
        code(git::invalid_branch),
        help("Branch names cannot start or end with '/' or contain '..'")
    )]
    InvalidBranchName { name: String },

    #[error("invalid tag name: {name}")]
    #[diagnostic(code(git::invalid_tag))]
    InvalidTagName { name: String },

    #[error("invalid tag prefix: {prefix}")]
    #[diagnostic(
        code(git::invalid_tag_prefix),
        help("Tag prefixes are limited to 32 characters and cannot contain '~', '^', ':', '?', '*', '[', '\\' or whitespace")
    )]
    InvalidTagPrefix { prefix: String },

    #[error("invalid commit hash: {hash}")]
    #[diagnostic(code(git::invalid_commit_hash))]
    InvalidCommitHash { hash: String },

    #[error("commit not found: {reference}")]
    #[diagnostic(code(git::commit_not_found))]
    CommitNotFound { reference: String },

    #[error("tag not found: {name}")]
    #[diagnostic(code(git::tag_not_found))]
    TagNotFound { name: String },

    #[error("remote not configured: {remote}")]
    #[diagnostic(code(git::remote_not_configured))]
    RemoteNotConfigured { remote: String },

    #[error("git operation failed: {operation}: {message}")]
    #[diagnostic(code(git::operation_failed))]
    OperationFailed { operation: String, message: String },
}

impl GitDomainError {
    pub fn operation_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
