//! Caching decorator over the source-control port
//!
//! Repository info is requested repeatedly inside one use-case invocation;
//! this decorator absorbs the duplicates with a short TTL. Every mutating
//! operation invalidates the cache so callers never act on stale state.

use crate::domains::git::{
    entities::{Commit, DiffStats, RepositoryInfo, Tag, TagList},
    errors::GitDomainError,
    repository::SourceControlPort,
    value_objects::{BranchName, CommitHash, RefName, RemoteName, TagName, TagPrefix},
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Source-control port with a TTL cache around `get_info`
pub struct CachedSourceControl {
    inner: Arc<dyn SourceControlPort>,
    ttl: Duration,
    info: RwLock<Option<(Instant, RepositoryInfo)>>,
}

impl CachedSourceControl {
    pub fn new(inner: Arc<dyn SourceControlPort>) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: Arc<dyn SourceControlPort>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            info: RwLock::new(None),
        }
    }

    fn cached_info(&self) -> Option<RepositoryInfo> {
        let guard = self.info.read().expect("info cache lock");
        guard
            .as_ref()
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, info)| info.clone())
    }

    fn invalidate(&self) {
        *self.info.write().expect("info cache lock") = None;
    }
}

#[async_trait]
impl SourceControlPort for CachedSourceControl {
    async fn get_info(&self) -> Result<RepositoryInfo, GitDomainError> {
        if let Some(info) = self.cached_info() {
            return Ok(info);
        }
        let info = self.inner.get_info().await?;
        *self.info.write().expect("info cache lock") = Some((Instant::now(), info.clone()));
        Ok(info)
    }

    async fn get_remotes(&self) -> Result<Vec<RemoteName>, GitDomainError> {
        self.inner.get_remotes().await
    }

    async fn get_branches(&self) -> Result<Vec<BranchName>, GitDomainError> {
        self.inner.get_branches().await
    }

    async fn get_current_branch(&self) -> Result<BranchName, GitDomainError> {
        self.inner.get_current_branch().await
    }

    async fn get_commit(&self, hash: &CommitHash) -> Result<Commit, GitDomainError> {
        self.inner.get_commit(hash).await
    }

    async fn get_commits_between(
        &self,
        from: Option<&RefName>,
        to: &RefName,
    ) -> Result<Vec<Commit>, GitDomainError> {
        self.inner.get_commits_between(from, to).await
    }

    async fn get_commits_since(&self, reference: &RefName) -> Result<Vec<Commit>, GitDomainError> {
        self.inner.get_commits_since(reference).await
    }

    async fn get_latest_commit(&self, branch: &BranchName) -> Result<Commit, GitDomainError> {
        self.inner.get_latest_commit(branch).await
    }

    async fn get_commit_diff_stats(&self, hash: &CommitHash) -> Result<DiffStats, GitDomainError> {
        self.inner.get_commit_diff_stats(hash).await
    }

    async fn get_commit_patch(&self, hash: &CommitHash) -> Result<String, GitDomainError> {
        self.inner.get_commit_patch(hash).await
    }

    async fn get_file_at_ref(
        &self,
        reference: &RefName,
        path: &PathBuf,
    ) -> Result<Option<Vec<u8>>, GitDomainError> {
        self.inner.get_file_at_ref(reference, path).await
    }

    async fn get_tags(&self) -> Result<TagList, GitDomainError> {
        self.inner.get_tags().await
    }

    async fn get_tag(&self, name: &TagName) -> Result<Option<Tag>, GitDomainError> {
        self.inner.get_tag(name).await
    }

    async fn get_latest_version_tag(
        &self,
        prefix: &TagPrefix,
    ) -> Result<Option<Tag>, GitDomainError> {
        self.inner.get_latest_version_tag(prefix).await
    }

    async fn create_tag(
        &self,
        name: &TagName,
        target: &CommitHash,
        message: &str,
    ) -> Result<Tag, GitDomainError> {
        let tag = self.inner.create_tag(name, target, message).await?;
        self.invalidate();
        Ok(tag)
    }

    async fn delete_tag(&self, name: &TagName) -> Result<(), GitDomainError> {
        self.inner.delete_tag(name).await?;
        self.invalidate();
        Ok(())
    }

    async fn push_tag(&self, name: &TagName, remote: &RemoteName) -> Result<(), GitDomainError> {
        self.inner.push_tag(name, remote).await?;
        self.invalidate();
        Ok(())
    }

    async fn is_dirty(&self) -> Result<bool, GitDomainError> {
        self.inner.is_dirty().await
    }

    async fn fetch(&self, remote: &RemoteName) -> Result<(), GitDomainError> {
        self.inner.fetch(remote).await?;
        self.invalidate();
        Ok(())
    }

    async fn pull(&self, remote: &RemoteName) -> Result<(), GitDomainError> {
        self.inner.pull(remote).await?;
        self.invalidate();
        Ok(())
    }

    async fn push(&self, remote: &RemoteName) -> Result<(), GitDomainError> {
        self.inner.push(remote).await?;
        self.invalidate();
        Ok(())
    }
}
