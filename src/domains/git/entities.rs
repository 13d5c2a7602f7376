//! Git entities crossing the source-control port

use crate::domains::git::value_objects::{BranchName, CommitHash, RemoteName, TagName, TagPrefix};
use crate::domains::semantic::value_objects::SemanticVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A commit as reported by the source-control driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub hash: CommitHash,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
    pub parents: Vec<CommitHash>,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// First non-empty message line
    pub fn subject(&self) -> &str {
        self.message
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("")
            .trim()
    }
}

/// An annotated or lightweight tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: TagName,
    pub target: CommitHash,
    /// Message and tagger are present for annotated tags only
    pub message: Option<String>,
    pub tagger: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl Tag {
    pub fn lightweight(name: TagName, target: CommitHash) -> Self {
        Self {
            name,
            target,
            message: None,
            tagger: None,
            date: None,
        }
    }

    pub fn is_annotated(&self) -> bool {
        self.message.is_some()
    }
}

/// A collection of tags with version-aware lookups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagList {
    tags: Vec<Tag>,
}

impl TagList {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags whose name starts with the given prefix
    pub fn with_prefix(&self, prefix: &TagPrefix) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|tag| prefix.strip(tag.name.as_str()).is_some())
            .collect()
    }

    /// The highest semantic version among prefixed tags, with its tag
    pub fn latest_version(&self, prefix: &TagPrefix) -> Option<(&Tag, SemanticVersion)> {
        self.tags
            .iter()
            .filter_map(|tag| {
                let stripped = prefix.strip(tag.name.as_str())?;
                let version = SemanticVersion::parse(stripped).ok()?;
                Some((tag, version))
            })
            .max_by(|(_, a), (_, b)| a.cmp(b))
    }
}

/// A configured remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remote {
    pub name: RemoteName,
    pub url: String,
}

/// Snapshot of the repository the engine is operating on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub root: PathBuf,
    pub current_branch: BranchName,
    pub default_branch: BranchName,
    pub remotes: Vec<Remote>,
    pub is_dirty: bool,
    pub head_commit: CommitHash,
}

impl RepositoryInfo {
    /// The repository name derived from the root directory
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repository".to_string())
    }
}

/// Line-level statistics for one commit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffStats {
    pub files: Vec<FileDiffStat>,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn files_changed(&self) -> usize {
        self.files.len()
    }
}

/// Per-file slice of a commit diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiffStat {
    pub path: PathBuf,
    pub insertions: usize,
    pub deletions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Tag {
        Tag::lightweight(
            TagName::from_trusted(name),
            CommitHash::from_trusted("deadbeefcafe"),
        )
    }

    #[test]
    fn tag_list_filters_by_prefix() {
        let list = TagList::new(vec![tag("v1.0.0"), tag("v1.1.0"), tag("app-2.0.0")]);
        let prefix = TagPrefix::default();
        assert_eq!(list.with_prefix(&prefix).len(), 2);
    }

    #[test]
    fn tag_list_finds_latest_by_semver() {
        let list = TagList::new(vec![
            tag("v1.9.0"),
            tag("v1.10.0"),
            tag("v1.2.0"),
            tag("not-a-version"),
        ]);
        let prefix = TagPrefix::default();
        let (latest, version) = list.latest_version(&prefix).unwrap();
        // 1.10.0 beats 1.9.0 numerically even though it sorts lower lexically
        assert_eq!(latest.name.as_str(), "v1.10.0");
        assert_eq!(version.to_string(), "1.10.0");
    }

    #[test]
    fn tag_list_latest_ignores_prereleases_ordering() {
        let list = TagList::new(vec![tag("v2.0.0-rc.1"), tag("v2.0.0")]);
        let prefix = TagPrefix::default();
        let (latest, _) = list.latest_version(&prefix).unwrap();
        assert_eq!(latest.name.as_str(), "v2.0.0");
    }

    #[test]
    fn repository_name_comes_from_root() {
        let info = RepositoryInfo {
            root: PathBuf::from("/work/acme-api"),
            current_branch: BranchName::from_trusted("main"),
            default_branch: BranchName::from_trusted("main"),
            remotes: vec![],
            is_dirty: false,
            head_commit: CommitHash::from_trusted("deadbeefcafe"),
        };
        assert_eq!(info.name(), "acme-api");
    }

    #[test]
    fn commit_subject_skips_leading_blank_lines() {
        let commit = Commit {
            hash: CommitHash::from_trusted("deadbeefcafe"),
            message: "\nfeat: add thing\n\nbody".to_string(),
            author_name: "Dev".to_string(),
            author_email: "dev@example.com".to_string(),
            date: Utc::now(),
            parents: vec![],
        };
        assert_eq!(commit.subject(), "feat: add thing");
    }
}
