//! Git value objects
//!
//! Newtypes that validate at construction so invalid references never reach
//! the source-control port. The reject set for references is `:?*[\` plus
//! whitespace; tilde and caret stay legal because revision navigation
//! (`HEAD~2`, `v1.0.0^`) depends on them.

use crate::domains::git::errors::GitDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

const REF_REJECT: &[char] = &[':', '?', '*', '[', '\\'];
const TAG_PREFIX_MAX: usize = 32;

fn has_rejected_ref_chars(value: &str) -> bool {
    value.contains(REF_REJECT) || value.chars().any(char::is_whitespace)
}

/// A commit hash
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitHash(String);

impl CommitHash {
    /// Validates an abbreviated or full hex hash
    pub fn new(hash: impl Into<String>) -> Result<Self, GitDomainError> {
        let hash = hash.into();
        let valid = (4..=64).contains(&hash.len())
            && hash.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(GitDomainError::InvalidCommitHash { hash });
        }
        Ok(Self(hash.to_lowercase()))
    }

    /// Wraps a hash that already came from the source-control driver
    pub fn from_trusted(hash: impl Into<String>) -> Self {
        Self(hash.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, the usual display form
    pub fn short(&self) -> &str {
        let end = self.0.len().min(7);
        &self.0[..end]
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A git revision reference (branch, tag, or navigation expression)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefName(String);

impl RefName {
    pub fn new(reference: impl Into<String>) -> Result<Self, GitDomainError> {
        let reference = reference.into();
        if reference.is_empty() || has_rejected_ref_chars(&reference) {
            return Err(GitDomainError::InvalidRef { reference });
        }
        Ok(Self(reference))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A branch name following git's naming rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchName(String);

impl BranchName {
    pub fn new(name: impl Into<String>) -> Result<Self, GitDomainError> {
        let name = name.into();
        let invalid = name.is_empty()
            || has_rejected_ref_chars(&name)
            || name.starts_with('/')
            || name.ends_with('/')
            || name.contains("..");
        if invalid {
            return Err(GitDomainError::InvalidBranchName { name });
        }
        Ok(Self(name))
    }

    pub fn from_trusted(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tag name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagName(String);

impl TagName {
    pub fn new(name: impl Into<String>) -> Result<Self, GitDomainError> {
        let name = name.into();
        if name.is_empty() || has_rejected_ref_chars(&name) {
            return Err(GitDomainError::InvalidTagName { name });
        }
        Ok(Self(name))
    }

    pub fn from_trusted(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tag prefix such as `v` or `app-v`
///
/// Stricter than references: tilde and caret are rejected too, and the
/// length is capped so prefixed tags stay reasonable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagPrefix(String);

impl TagPrefix {
    pub fn new(prefix: impl Into<String>) -> Result<Self, GitDomainError> {
        let prefix = prefix.into();
        let invalid = prefix.len() > TAG_PREFIX_MAX
            || has_rejected_ref_chars(&prefix)
            || prefix.contains(&['~', '^'][..]);
        if invalid {
            return Err(GitDomainError::InvalidTagPrefix { prefix });
        }
        Ok(Self(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The tag name for a canonical version string
    pub fn tag_for(&self, version: &str) -> TagName {
        TagName::from_trusted(format!("{}{}", self.0, version))
    }

    /// Strips this prefix from a tag name, when present
    pub fn strip<'a>(&self, tag: &'a str) -> Option<&'a str> {
        tag.strip_prefix(self.0.as_str())
    }
}

impl Default for TagPrefix {
    fn default() -> Self {
        Self("v".to_string())
    }
}

impl fmt::Display for TagPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named remote, `origin` by default
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteName(String);

impl RemoteName {
    pub fn new(name: impl Into<String>) -> Result<Self, GitDomainError> {
        let name = name.into();
        if name.is_empty() || has_rejected_ref_chars(&name) {
            return Err(GitDomainError::RemoteNotConfigured { remote: name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RemoteName {
    fn default() -> Self {
        Self("origin".to_string())
    }
}

impl fmt::Display for RemoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refs_allow_revision_navigation() {
        for reference in ["HEAD~2", "v1.0.0^", "main", "release/2024", "abc+build"] {
            assert!(RefName::new(reference).is_ok(), "{} should be legal", reference);
        }
    }

    #[test]
    fn refs_reject_glob_and_whitespace_characters() {
        for reference in ["v1:0", "what?", "v*", "refs[0]", "a\\b", "two words", "tab\there"] {
            assert!(RefName::new(reference).is_err(), "{} should be rejected", reference);
        }
    }

    #[test]
    fn branch_names_follow_git_rules() {
        assert!(BranchName::new("feature/login").is_ok());
        assert!(BranchName::new("/leading").is_err());
        assert!(BranchName::new("trailing/").is_err());
        assert!(BranchName::new("a..b").is_err());
        assert!(BranchName::new("").is_err());
    }

    #[test]
    fn tag_prefix_limits_length_and_charset() {
        assert!(TagPrefix::new("v").is_ok());
        assert!(TagPrefix::new("release-").is_ok());
        assert!(TagPrefix::new("").is_ok());
        assert!(TagPrefix::new("a".repeat(33)).is_err());
        assert!(TagPrefix::new("v~").is_err());
        assert!(TagPrefix::new("v^").is_err());
        assert!(TagPrefix::new("v v").is_err());
    }

    #[test]
    fn tag_prefix_builds_and_strips_tags() {
        let prefix = TagPrefix::default();
        assert_eq!(prefix.tag_for("1.2.3").as_str(), "v1.2.3");
        assert_eq!(prefix.strip("v1.2.3"), Some("1.2.3"));
        assert_eq!(prefix.strip("release-1.2.3"), None);
    }

    #[test]
    fn commit_hash_validation() {
        assert!(CommitHash::new("deadbeef").is_ok());
        assert!(CommitHash::new("abc").is_err());
        assert!(CommitHash::new("not-hex-at-all!").is_err());
        assert_eq!(CommitHash::from_trusted("ABCDEF1234567").short(), "abcdef1");
    }
}
