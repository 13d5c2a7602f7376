//! Semantic versioning domain error types

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by version parsing and changeset evaluation
#[derive(Error, Diagnostic, Debug)]
pub enum SemanticDomainError {
    #[error("invalid semantic version: {input}")]
    #[diagnostic(
        code(semantic::invalid_version),
        help("Versions must follow MAJOR.MINOR.PATCH with optional -prerelease and +build parts, e.g. 1.2.3-rc.1")
    )]
    InvalidVersion { input: String },

    #[error("no commits found between {from_ref} and {to_ref}")]
    #[diagnostic(
        code(semantic::no_commits),
        help("The selected range contains no commits; check the from/to references")
    )]
    NoCommitsFound { from_ref: String, to_ref: String },

    #[error("changeset contains no releasable commits")]
    #[diagnostic(
        code(semantic::empty_changeset),
        help("Every commit in the range was skipped; nothing to release")
    )]
    EmptyChangeSet,
}
