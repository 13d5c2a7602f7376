//! Semantic versioning value objects
//!
//! Immutable values covering version arithmetic, bump categories, and the
//! per-commit classification record produced by the analyzers.

use crate::domains::semantic::errors::SemanticDomainError;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// A semantic version with prerelease and build metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// The 0.0.0 version
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// The version a repository starts from when no tag exists yet
    pub fn initial() -> Self {
        Self::new(0, 1, 0)
    }

    /// Parses a version string, accepting an optional leading `v`.
    ///
    /// Rejects empty input, missing components, leading zeros, whitespace,
    /// and non-ASCII digits.
    pub fn parse(input: &str) -> Result<Self, SemanticDomainError> {
        let invalid = || SemanticDomainError::InvalidVersion {
            input: input.to_string(),
        };

        let raw = input.strip_prefix('v').unwrap_or(input);
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (version_part, build) = match raw.split_once('+') {
            Some((core, build)) => (core, Some(build)),
            None => (raw, None),
        };
        let (core, prerelease) = match version_part.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (version_part, None),
        };

        let mut numbers = core.split('.');
        let major = parse_component(numbers.next()).ok_or_else(invalid)?;
        let minor = parse_component(numbers.next()).ok_or_else(invalid)?;
        let patch = parse_component(numbers.next()).ok_or_else(invalid)?;
        if numbers.next().is_some() {
            return Err(invalid());
        }

        if let Some(pre) = prerelease {
            if !valid_dot_separated(pre) {
                return Err(invalid());
            }
        }
        if let Some(build) = build {
            if !valid_dot_separated(build) {
                return Err(invalid());
            }
        }

        Ok(Self {
            major,
            minor,
            patch,
            prerelease: prerelease.map(str::to_string),
            build: build.map(str::to_string),
        })
    }

    /// Applies a bump, clearing build metadata.
    ///
    /// A patch bump on a prerelease drops the prerelease (releases it); a
    /// prerelease bump on a stable version increments minor and attaches the
    /// identifier, and on an existing prerelease replaces the identifier.
    pub fn bump(&self, bump: BumpType, prerelease_id: Option<&str>) -> Self {
        match bump {
            BumpType::Major => Self::new(self.major + 1, 0, 0),
            BumpType::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpType::Patch => {
                if self.prerelease.is_some() {
                    Self::new(self.major, self.minor, self.patch)
                } else {
                    Self::new(self.major, self.minor, self.patch + 1)
                }
            }
            BumpType::Prerelease => {
                let identifier = prerelease_id.unwrap_or("rc.1").to_string();
                let mut next = if self.prerelease.is_some() {
                    Self::new(self.major, self.minor, self.patch)
                } else {
                    Self::new(self.major, self.minor + 1, 0)
                };
                next.prerelease = Some(identifier);
                next
            }
        }
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Equality that ignores build metadata, matching comparison semantics
    pub fn eq_ignoring_build(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }

    /// The git tag form of this version: `v` + canonical string
    pub fn tag_string(&self) -> String {
        format!("v{}", self)
    }
}

fn parse_component(part: Option<&str>) -> Option<u64> {
    let part = part?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if part.len() > 1 && part.starts_with('0') {
        return None;
    }
    part.parse().ok()
}

fn valid_dot_separated(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|id| {
            !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    /// Precedence per the SemVer specification: build metadata is ignored
    /// and a prerelease sorts before the same release triple.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            },
            other => other,
        }
    }
}

fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    // numeric identifiers sort before alphanumeric ones
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// The category of version bump to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    Major,
    Minor,
    Patch,
    Prerelease,
}

impl BumpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Prerelease => "prerelease",
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The SemVer-bump category implied by a changeset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Patch,
    Minor,
    Major,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }

    pub fn bump_type(&self) -> BumpType {
        match self {
            Self::Patch => BumpType::Patch,
            Self::Minor => BumpType::Minor,
            Self::Major => BumpType::Major,
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conventional-commit categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Chore,
    Docs,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Revert,
    Unknown,
}

impl CommitType {
    /// Maps a type token onto a category; anything outside the known set is
    /// `Unknown` (callers keep the verbatim token next to it).
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "feat" => Self::Feat,
            "fix" => Self::Fix,
            "chore" => Self::Chore,
            "docs" => Self::Docs,
            "refactor" => Self::Refactor,
            "perf" => Self::Perf,
            "test" => Self::Test,
            "build" => Self::Build,
            "ci" => Self::Ci,
            "revert" => Self::Revert,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Chore => "chore",
            Self::Docs => "docs",
            Self::Refactor => "refactor",
            Self::Perf => "perf",
            Self::Test => "test",
            Self::Build => "build",
            Self::Ci => "ci",
            Self::Revert => "revert",
            Self::Unknown => "unknown",
        }
    }

    /// Section heading used when grouping commits in a changelog
    pub fn section_title(&self) -> &'static str {
        match self {
            Self::Feat => "Features",
            Self::Fix => "Bug Fixes",
            Self::Chore => "Chores",
            Self::Docs => "Documentation",
            Self::Refactor => "Refactoring",
            Self::Perf => "Performance",
            Self::Test => "Tests",
            Self::Build => "Build",
            Self::Ci => "Continuous Integration",
            Self::Revert => "Reverts",
            Self::Unknown => "Other Changes",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a commit received its classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    Conventional,
    Heuristic,
    Ast,
    Ai,
    Manual,
}

impl ClassificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conventional => "conventional",
            Self::Heuristic => "heuristic",
            Self::Ast => "ast",
            Self::Ai => "ai",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-commit classification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitClassification {
    pub commit_hash: String,
    /// `None` when no method cleared the confidence gate
    pub commit_type: Option<CommitType>,
    pub scope: Option<String>,
    pub is_breaking: bool,
    pub breaking_reason: Option<String>,
    pub confidence: f64,
    pub method: ClassificationMethod,
    pub should_skip: bool,
}

impl CommitClassification {
    /// A full-confidence record for a commit the conventional parser handled
    pub fn conventional(
        commit_hash: impl Into<String>,
        commit_type: CommitType,
        scope: Option<String>,
        is_breaking: bool,
        breaking_reason: Option<String>,
    ) -> Self {
        Self {
            commit_hash: commit_hash.into(),
            commit_type: Some(commit_type),
            scope,
            is_breaking,
            breaking_reason,
            confidence: 1.0,
            method: ClassificationMethod::Conventional,
            should_skip: false,
        }
    }

    /// A record whose type was cleared because no method reached the
    /// confidence gate; the method of the best attempt is retained so
    /// reviewers can see what was tried.
    pub fn unresolved(commit_hash: impl Into<String>, method: ClassificationMethod, confidence: f64) -> Self {
        Self {
            commit_hash: commit_hash.into(),
            commit_type: None,
            scope: None,
            is_breaking: false,
            breaking_reason: None,
            confidence,
            method,
            should_skip: false,
        }
    }
}
