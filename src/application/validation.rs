//! Input validation shared by the use-case handlers
//!
//! Value objects validate their own shape; this module adds the
//! request-level checks (path traversal, notes size) and folds value-object
//! failures into one validation error type.

use miette::Diagnostic;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

pub use crate::domains::releases::value_objects::NOTES_MAX_BYTES;

#[derive(Error, Diagnostic, Debug)]
pub enum ValidationError {
    #[error("path escapes the repository: {path}")]
    #[diagnostic(
        code(validation::path_traversal),
        help("Paths may not contain '..' components")
    )]
    PathTraversal { path: String },

    #[error("invalid {field}: {reason}")]
    #[diagnostic(code(validation::invalid_input))]
    InvalidInput { field: String, reason: String },
}

/// Rejects paths with parent-directory components
pub fn require_safe_path(path: &Path) -> Result<(), ValidationError> {
    let escapes = path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir));
    if escapes {
        return Err(ValidationError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Enforces the notes body size limit
pub fn require_notes_size(text: &str) -> Result<(), ValidationError> {
    if text.len() > NOTES_MAX_BYTES {
        return Err(ValidationError::InvalidInput {
            field: "notes".to_string(),
            reason: format!("body exceeds {} bytes", NOTES_MAX_BYTES),
        });
    }
    Ok(())
}

/// Maps a value-object construction failure onto a named input field
pub fn field<T, E: Display>(name: &str, result: Result<T, E>) -> Result<T, ValidationError> {
    result.map_err(|e| ValidationError::InvalidInput {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parent_components_are_rejected() {
        assert!(require_safe_path(&PathBuf::from("/work/../etc/passwd")).is_err());
        assert!(require_safe_path(&PathBuf::from("repo/../../escape")).is_err());
        assert!(require_safe_path(&PathBuf::from("/work/repo")).is_ok());
        assert!(require_safe_path(&PathBuf::from("relative/dir")).is_ok());
    }

    #[test]
    fn notes_size_boundary() {
        assert!(require_notes_size(&"x".repeat(NOTES_MAX_BYTES)).is_ok());
        assert!(require_notes_size(&"x".repeat(NOTES_MAX_BYTES + 1)).is_err());
    }

    #[test]
    fn field_wraps_the_failure_reason() {
        let result: Result<(), &str> = Err("too long");
        let err = field("tag prefix", result).unwrap_err();
        assert!(err.to_string().contains("tag prefix"));
        assert!(err.to_string().contains("too long"));
    }
}
