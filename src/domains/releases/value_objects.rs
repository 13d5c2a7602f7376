//! Release domain value objects

use crate::domains::releases::errors::ReleaseDomainError;
use crate::domains::semantic::entities::ChangeSet;
use crate::domains::semantic::value_objects::{ReleaseType, SemanticVersion};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

const RUN_ID_MAX: usize = 64;
const APPROVER_MAX: usize = 256;
const URL_MAX: usize = 2048;
pub const NOTES_MAX_BYTES: usize = 1024 * 1024;

static RUN_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("static run-id pattern"));

/// Identity of one release run.
///
/// Generated ids encode a nanosecond timestamp plus a fingerprint of the
/// analysis configuration, so replanning the same range with the same
/// configuration yields a recognizably related identity and retries stay
/// idempotent across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Result<Self, ReleaseDomainError> {
        let id = id.into();
        if id.len() > RUN_ID_MAX || !RUN_ID.is_match(&id) {
            return Err(ReleaseDomainError::InvalidRunId { id });
        }
        Ok(Self(id))
    }

    /// A fresh id from the current time and a configuration fingerprint
    pub fn generate(config_fingerprint: u64) -> Self {
        let nanos = Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        Self(format!("rel-{}-{:016x}", nanos, config_fingerprint))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who approved a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver(String);

impl Approver {
    pub fn new(name: impl Into<String>) -> Result<Self, ReleaseDomainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ReleaseDomainError::InvalidApprover {
                reason: "approver name is empty".to_string(),
            });
        }
        if name.len() > APPROVER_MAX {
            return Err(ReleaseDomainError::InvalidApprover {
                reason: format!("approver name exceeds {} characters", APPROVER_MAX),
            });
        }
        if name.chars().any(char::is_control) {
            return Err(ReleaseDomainError::InvalidApprover {
                reason: "approver name contains control characters".to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Approver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the release was announced or published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishUrl(Url);

impl PublishUrl {
    pub fn new(url: impl AsRef<str>) -> Result<Self, ReleaseDomainError> {
        let raw = url.as_ref();
        if raw.len() > URL_MAX {
            return Err(ReleaseDomainError::InvalidPublishUrl {
                reason: format!("longer than {} characters", URL_MAX),
            });
        }
        let parsed = Url::parse(raw).map_err(|e| ReleaseDomainError::InvalidPublishUrl {
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ReleaseDomainError::InvalidPublishUrl {
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        Ok(Self(parsed))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PublishUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Lifecycle states of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseState {
    Draft,
    Versioned,
    NotesGenerated,
    Approved,
    Publishing,
    Published,
    Failed,
}

impl ReleaseState {
    /// Published and Failed accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Versioned => "versioned",
            Self::NotesGenerated => "notes_generated",
            Self::Approved => "approved",
            Self::Publishing => "publishing",
            Self::Published => "published",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a release can be approved right now, and why not otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStatus {
    pub can_approve: bool,
    pub reason: String,
}

/// The computed plan for one release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePlan {
    pub current_version: SemanticVersion,
    pub next_version: SemanticVersion,
    pub release_type: ReleaseType,
    pub change_set: ChangeSet,
    pub dry_run: bool,
}

/// Generated release notes and their provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseNotes {
    pub text: String,
    pub summary: String,
    pub provider: String,
    pub generated_at: DateTime<Utc>,
    pub ai_generated: bool,
}

impl ReleaseNotes {
    pub fn deterministic(text: String, summary: String) -> Self {
        Self {
            text,
            summary,
            provider: "deterministic".to_string(),
            generated_at: Utc::now(),
            ai_generated: false,
        }
    }

    pub fn ai(text: String, summary: String, provider: impl Into<String>) -> Self {
        Self {
            text,
            summary,
            provider: provider.into(),
            generated_at: Utc::now(),
            ai_generated: true,
        }
    }
}

/// Outcome of one plugin invocation, kept on the aggregate for audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginExecutionRecord {
    pub plugin_id: String,
    pub hook: String,
    pub success: bool,
    pub message: Option<String>,
    pub executed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_accepts_generated_shape() {
        let id = RunId::generate(0xdead_beef);
        assert!(id.as_str().starts_with("rel-"));
        assert!(RunId::new(id.as_str()).is_ok());
        assert!(id.as_str().len() <= 64);
    }

    #[test]
    fn run_id_rejects_bad_input() {
        assert!(RunId::new("").is_err());
        assert!(RunId::new("-leading-dash").is_err());
        assert!(RunId::new("has space").is_err());
        assert!(RunId::new("a".repeat(65)).is_err());
        assert!(RunId::new("a".repeat(64)).is_ok());
    }

    #[test]
    fn approver_rejects_control_characters_and_length() {
        assert!(Approver::new("Riley Chen").is_ok());
        assert!(Approver::new("bad\nname").is_err());
        assert!(Approver::new("tab\tname").is_err());
        assert!(Approver::new("x".repeat(257)).is_err());
        assert!(Approver::new("x".repeat(256)).is_ok());
    }

    #[test]
    fn approver_errors_do_not_echo_the_name() {
        let err = Approver::new("evil\r\nname").unwrap_err();
        assert!(!err.to_string().contains("evil"));
    }

    #[test]
    fn publish_url_requires_http_schemes() {
        assert!(PublishUrl::new("https://example.com/releases/1").is_ok());
        assert!(PublishUrl::new("http://example.com").is_ok());
        assert!(PublishUrl::new("ftp://example.com").is_err());
        assert!(PublishUrl::new("not a url").is_err());
        let long = format!("https://example.com/{}", "a".repeat(2048));
        assert!(PublishUrl::new(long).is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(ReleaseState::Published.is_terminal());
        assert!(ReleaseState::Failed.is_terminal());
        assert!(!ReleaseState::Approved.is_terminal());
        assert!(!ReleaseState::Draft.is_terminal());
    }
}
