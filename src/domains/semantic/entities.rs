//! Conventional-commit model and the changeset aggregate

use crate::domains::semantic::{
    errors::SemanticDomainError,
    value_objects::{CommitClassification, CommitType, ReleaseType},
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `type(scope)!: subject` on the first non-empty line
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^)]*)\))?(?P<bang>!)?:\s*(?P<subject>.+)$")
        .expect("static commit header pattern")
});

/// `Token: value` footers, including the two breaking-change spellings
static FOOTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<token>[A-Za-z][A-Za-z -]*?)\s*:\s*(?P<value>.*)$")
        .expect("static commit footer pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// A commit whose message was classified, conventionally or by a fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConventionalCommit {
    pub hash: String,
    pub commit_type: CommitType,
    /// The type token exactly as written, preserved for unknown types
    pub type_token: Option<String>,
    pub scope: Option<String>,
    pub breaking: bool,
    pub breaking_reason: Option<String>,
    pub subject: String,
    pub body: Option<String>,
    pub author: CommitAuthor,
    pub date: DateTime<Utc>,
    pub raw_message: String,
}

impl ConventionalCommit {
    /// Parses a conventional commit message.
    ///
    /// Returns `None` when the first non-empty line does not follow the
    /// `type(scope)!: subject` pattern; such commits go through the
    /// fallback analyzers instead.
    pub fn parse(
        hash: impl Into<String>,
        message: &str,
        author: CommitAuthor,
        date: DateTime<Utc>,
    ) -> Option<Self> {
        let mut lines = message.lines();
        let header = loop {
            match lines.next() {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
                None => return None,
            }
        };

        let captures = HEADER.captures(header.trim_end())?;
        let type_token = captures.name("type").map(|m| m.as_str().to_string())?;
        let commit_type = CommitType::from_token(&type_token);
        let scope = captures
            .name("scope")
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());
        let mut breaking = captures.name("bang").is_some();
        let subject = captures.name("subject")?.as_str().trim().to_string();

        // Body is everything after one blank line following the header.
        let remainder: Vec<&str> = lines.collect();
        let body_lines: &[&str] = match remainder.split_first() {
            Some((first, rest)) if first.trim().is_empty() => rest,
            _ => &[],
        };
        let body_text = body_lines.join("\n").trim().to_string();
        let body = (!body_text.is_empty()).then_some(body_text);

        let mut breaking_reason = None;
        for line in body_lines {
            if let Some(captures) = FOOTER.captures(line) {
                let token = captures.name("token").map(|m| m.as_str()).unwrap_or("");
                let normalized = token.to_ascii_uppercase().replace('-', " ");
                if normalized == "BREAKING CHANGE" {
                    breaking = true;
                    let value = captures
                        .name("value")
                        .map(|m| m.as_str().trim().to_string())
                        .filter(|v| !v.is_empty());
                    breaking_reason = value;
                }
            }
        }
        if breaking && breaking_reason.is_none() {
            breaking_reason = Some(subject.clone());
        }

        Some(Self {
            hash: hash.into(),
            commit_type,
            type_token: Some(type_token),
            scope,
            breaking,
            breaking_reason: breaking.then_some(breaking_reason).flatten(),
            subject,
            body,
            author,
            date,
            raw_message: message.to_string(),
        })
    }

    /// Builds a commit record from a fallback classification.
    ///
    /// The subject falls back to the first non-empty message line; a cleared
    /// classification yields an `Unknown` type.
    pub fn from_classification(
        hash: impl Into<String>,
        message: &str,
        author: CommitAuthor,
        date: DateTime<Utc>,
        classification: &CommitClassification,
    ) -> Self {
        let subject = message
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("")
            .trim()
            .to_string();
        Self {
            hash: hash.into(),
            commit_type: classification.commit_type.unwrap_or(CommitType::Unknown),
            type_token: classification.commit_type.map(|t| t.as_str().to_string()),
            scope: classification.scope.clone(),
            breaking: classification.is_breaking,
            breaking_reason: classification.breaking_reason.clone(),
            subject,
            body: None,
            author,
            date,
            raw_message: message.to_string(),
        }
    }

    /// The classification record implied by a successful conventional parse
    pub fn classification(&self) -> CommitClassification {
        CommitClassification::conventional(
            self.hash.clone(),
            self.commit_type,
            self.scope.clone(),
            self.breaking,
            self.breaking_reason.clone(),
        )
    }

    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(7);
        &self.hash[..end]
    }
}

/// Ordered collection of classified commits feeding one release plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSet {
    pub id: String,
    pub from_ref: Option<String>,
    pub to_ref: String,
    commits: Vec<ConventionalCommit>,
    classifications: Vec<CommitClassification>,
}

impl ChangeSet {
    pub fn new(id: impl Into<String>, from_ref: Option<String>, to_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from_ref,
            to_ref: to_ref.into(),
            commits: Vec::new(),
            classifications: Vec::new(),
        }
    }

    /// Adds a classified commit, preserving insertion order.
    ///
    /// Skippable classifications are dropped here; returns whether the
    /// commit was kept. Duplicate hashes are tolerated.
    pub fn add(&mut self, commit: ConventionalCommit, classification: CommitClassification) -> bool {
        if classification.should_skip {
            return false;
        }
        self.commits.push(commit);
        self.classifications.push(classification);
        true
    }

    pub fn commits(&self) -> &[ConventionalCommit] {
        &self.commits
    }

    pub fn classifications(&self) -> &[CommitClassification] {
        &self.classifications
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Derives the bump category: any breaking commit wins, then features,
    /// otherwise patch. An empty changeset has no release type.
    pub fn release_type(&self) -> Result<ReleaseType, SemanticDomainError> {
        if self.commits.is_empty() {
            return Err(SemanticDomainError::EmptyChangeSet);
        }
        if self.commits.iter().any(|c| c.breaking) {
            return Ok(ReleaseType::Major);
        }
        if self
            .commits
            .iter()
            .any(|c| c.commit_type == CommitType::Feat)
        {
            return Ok(ReleaseType::Minor);
        }
        Ok(ReleaseType::Patch)
    }

    /// One-line summary of the changes, used in tag messages and contexts
    pub fn summary(&self) -> String {
        let breaking = self.commits.iter().filter(|c| c.breaking).count();
        let features = self
            .commits
            .iter()
            .filter(|c| !c.breaking && c.commit_type == CommitType::Feat)
            .count();
        let fixes = self
            .commits
            .iter()
            .filter(|c| !c.breaking && c.commit_type == CommitType::Fix)
            .count();

        let mut parts = Vec::new();
        if breaking > 0 {
            parts.push(format!("{} breaking change(s)", breaking));
        }
        if features > 0 {
            parts.push(format!("{} feature(s)", features));
        }
        if fixes > 0 {
            parts.push(format!("{} fix(es)", fixes));
        }
        if parts.is_empty() {
            "No significant changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}
