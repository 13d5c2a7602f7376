//! Source-control port
//!
//! The only surface the engine uses to talk to a version-control system.
//! Implementations wrap an actual git driver; the engine itself never
//! shells out or links one.

use crate::domains::git::{
    entities::{Commit, DiffStats, RepositoryInfo, Tag, TagList},
    errors::GitDomainError,
    value_objects::{BranchName, CommitHash, RefName, RemoteName, TagName, TagPrefix},
};
use async_trait::async_trait;
use std::path::PathBuf;

/// Abstract source-control interface
#[async_trait]
pub trait SourceControlPort: Send + Sync {
    /// Snapshot of branch, remotes, dirtiness, and head
    async fn get_info(&self) -> Result<RepositoryInfo, GitDomainError>;

    async fn get_remotes(&self) -> Result<Vec<RemoteName>, GitDomainError>;

    async fn get_branches(&self) -> Result<Vec<BranchName>, GitDomainError>;

    async fn get_current_branch(&self) -> Result<BranchName, GitDomainError>;

    async fn get_commit(&self, hash: &CommitHash) -> Result<Commit, GitDomainError>;

    /// Commits reachable from `to` but not from `from`, oldest first.
    /// A `None` from-ref means the range starts at the repository root.
    async fn get_commits_between(
        &self,
        from: Option<&RefName>,
        to: &RefName,
    ) -> Result<Vec<Commit>, GitDomainError>;

    async fn get_commits_since(&self, reference: &RefName) -> Result<Vec<Commit>, GitDomainError>;

    async fn get_latest_commit(&self, branch: &BranchName) -> Result<Commit, GitDomainError>;

    async fn get_commit_diff_stats(&self, hash: &CommitHash) -> Result<DiffStats, GitDomainError>;

    /// Unified diff text for one commit
    async fn get_commit_patch(&self, hash: &CommitHash) -> Result<String, GitDomainError>;

    /// File contents at a given revision; `None` when the file is absent there
    async fn get_file_at_ref(
        &self,
        reference: &RefName,
        path: &PathBuf,
    ) -> Result<Option<Vec<u8>>, GitDomainError>;

    async fn get_tags(&self) -> Result<TagList, GitDomainError>;

    async fn get_tag(&self, name: &TagName) -> Result<Option<Tag>, GitDomainError>;

    /// Highest semantic-version tag carrying the prefix
    async fn get_latest_version_tag(&self, prefix: &TagPrefix) -> Result<Option<Tag>, GitDomainError>;

    /// Creates an annotated tag at the given commit
    async fn create_tag(
        &self,
        name: &TagName,
        target: &CommitHash,
        message: &str,
    ) -> Result<Tag, GitDomainError>;

    async fn delete_tag(&self, name: &TagName) -> Result<(), GitDomainError>;

    async fn push_tag(&self, name: &TagName, remote: &RemoteName) -> Result<(), GitDomainError>;

    async fn is_dirty(&self) -> Result<bool, GitDomainError>;

    async fn fetch(&self, remote: &RemoteName) -> Result<(), GitDomainError>;

    async fn pull(&self, remote: &RemoteName) -> Result<(), GitDomainError>;

    async fn push(&self, remote: &RemoteName) -> Result<(), GitDomainError>;
}
