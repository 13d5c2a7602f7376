//! Plugin hook contract values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lifecycle hooks invoked around publishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginHook {
    PrePublish,
    PostPublish,
    OnSuccess,
    OnFailure,
}

impl PluginHook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrePublish => "pre_publish",
            Self::PostPublish => "post_publish",
            Self::OnSuccess => "on_success",
            Self::OnFailure => "on_failure",
        }
    }
}

impl fmt::Display for PluginHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a plugin can see about the release being processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseContext {
    pub version: String,
    pub previous_version: Option<String>,
    pub release_type: String,
    pub repository_name: String,
    pub repository_path: PathBuf,
    pub branch: String,
    pub tag_name: String,
    /// One-line description of the changeset
    pub change_summary: String,
    pub changelog: Option<String>,
    pub release_notes: Option<String>,
    pub dry_run: bool,
    pub timestamp: DateTime<Utc>,
}

/// A direct invocation of one plugin action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRequest {
    pub plugin_id: String,
    pub action: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// What a plugin reported back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResponse {
    pub plugin_id: String,
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl PluginResponse {
    pub fn ok(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(plugin_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
