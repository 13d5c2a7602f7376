//! Plan use-case
//!
//! Resolves the commit range, classifies every commit, computes the next
//! version, and persists a fresh release aggregate carrying the plan. A
//! dry-run plan is persisted too, so workflow state stays observable.

use crate::application::commands::{CommandHandler, ReleaseStore};
use crate::application::validation;
use crate::domains::analysis::services::CommitAnalyzer;
use crate::domains::git::{
    errors::GitDomainError,
    repository::SourceControlPort,
    value_objects::{BranchName, RefName, TagPrefix},
};
use crate::domains::releases::{
    entities::Release,
    value_objects::{ReleasePlan, RunId},
};
use crate::domains::semantic::{
    entities::{ChangeSet, CommitAuthor, ConventionalCommit},
    errors::SemanticDomainError,
    repository::VersionCalculatorPort,
    value_objects::{CommitClassification, ReleaseType, SemanticVersion},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PlanReleaseCommand {
    pub tag_prefix: String,
    /// Explicit range start; defaults to the latest prefixed tag, or the
    /// repository root when no tag exists
    pub from_ref: Option<String>,
    /// Explicit range end; defaults to the branch head
    pub to_ref: Option<String>,
    /// Branch to release from; defaults to the current branch
    pub branch: Option<String>,
    pub dry_run: bool,
    /// Classifications that bypass the analyzer for matching hashes
    pub manual_overrides: Vec<CommitClassification>,
    pub actor: String,
}

impl Default for PlanReleaseCommand {
    fn default() -> Self {
        Self {
            tag_prefix: "v".to_string(),
            from_ref: None,
            to_ref: None,
            branch: None,
            dry_run: false,
            manual_overrides: Vec::new(),
            actor: "release-engine".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanReleaseResult {
    pub run_id: RunId,
    pub current_version: SemanticVersion,
    pub next_version: SemanticVersion,
    pub release_type: ReleaseType,
    pub commit_count: usize,
    pub dry_run: bool,
}

pub struct PlanReleaseHandler {
    git: Arc<dyn SourceControlPort>,
    analyzer: Arc<CommitAnalyzer>,
    calculator: Arc<dyn VersionCalculatorPort>,
    store: ReleaseStore,
}

impl PlanReleaseHandler {
    pub fn new(
        git: Arc<dyn SourceControlPort>,
        analyzer: Arc<CommitAnalyzer>,
        calculator: Arc<dyn VersionCalculatorPort>,
        store: ReleaseStore,
    ) -> Self {
        Self {
            git,
            analyzer,
            calculator,
            store,
        }
    }
}

#[async_trait]
impl CommandHandler<PlanReleaseCommand> for PlanReleaseHandler {
    type Output = PlanReleaseResult;

    async fn handle(
        &self,
        command: PlanReleaseCommand,
        cancel: &CancellationToken,
    ) -> crate::Result<PlanReleaseResult> {
        let tag_prefix = TagPrefix::new(command.tag_prefix.clone())?;
        if let Some(reference) = &command.from_ref {
            validation::field("from ref", RefName::new(reference.clone()))?;
        }
        if let Some(reference) = &command.to_ref {
            validation::field("to ref", RefName::new(reference.clone()))?;
        }

        let info = self.git.get_info().await?;
        validation::require_safe_path(&info.root)?;
        if info.is_dirty && !command.dry_run {
            return Err(GitDomainError::WorkingTreeDirty.into());
        }

        let branch = match &command.branch {
            Some(name) => BranchName::new(name.clone())?,
            None => info.current_branch.clone(),
        };

        // Range start and the version we are releasing from.
        let latest_tag = self.git.get_latest_version_tag(&tag_prefix).await?;
        let current_version = match &latest_tag {
            Some(tag) => match tag_prefix.strip(tag.name.as_str()) {
                Some(stripped) => SemanticVersion::parse(stripped)?,
                None => SemanticVersion::initial(),
            },
            None => SemanticVersion::initial(),
        };
        let from_ref = match &command.from_ref {
            Some(explicit) => Some(RefName::new(explicit.clone())?),
            None => latest_tag
                .as_ref()
                .map(|tag| RefName::new(tag.name.as_str().to_string()))
                .transpose()?,
        };
        let to_ref = match &command.to_ref {
            Some(explicit) => RefName::new(explicit.clone())?,
            None => RefName::new(branch.as_str().to_string())?,
        };

        let commits = self
            .git
            .get_commits_between(from_ref.as_ref(), &to_ref)
            .await?;
        if commits.is_empty() {
            return Err(SemanticDomainError::NoCommitsFound {
                from_ref: from_ref
                    .as_ref()
                    .map(|r| r.as_str().to_string())
                    .unwrap_or_else(|| "root".to_string()),
                to_ref: to_ref.as_str().to_string(),
            }
            .into());
        }

        let overrides: HashMap<String, CommitClassification> = command
            .manual_overrides
            .iter()
            .cloned()
            .map(|c| (c.commit_hash.clone(), c))
            .collect();

        // Conventional parsing first; only the rest goes through the
        // fallback chain. Classification may run concurrently, but the
        // changeset keeps the original commit order.
        let mut parsed: Vec<Option<ConventionalCommit>> = Vec::with_capacity(commits.len());
        let mut unresolved = Vec::new();
        for commit in &commits {
            if overrides.contains_key(commit.hash.as_str()) {
                parsed.push(None);
                unresolved.push(commit.clone());
                continue;
            }
            let author = CommitAuthor {
                name: commit.author_name.clone(),
                email: commit.author_email.clone(),
            };
            match ConventionalCommit::parse(
                commit.hash.as_str(),
                &commit.message,
                author,
                commit.date,
            ) {
                Some(conventional) => parsed.push(Some(conventional)),
                None => {
                    parsed.push(None);
                    unresolved.push(commit.clone());
                }
            }
        }

        let mut fallback = self
            .analyzer
            .classify_all(&unresolved, &overrides, cancel)
            .await
            .into_iter();

        let range_id = format!(
            "{}..{}",
            from_ref
                .as_ref()
                .map(|r| r.as_str())
                .unwrap_or("root"),
            to_ref.as_str()
        );
        let mut change_set = ChangeSet::new(
            range_id,
            from_ref.as_ref().map(|r| r.as_str().to_string()),
            to_ref.as_str().to_string(),
        );

        for (commit, conventional) in commits.iter().zip(parsed.into_iter()) {
            match conventional {
                Some(conventional) => {
                    let classification = conventional.classification();
                    change_set.add(conventional, classification);
                }
                None => {
                    let classification = fallback
                        .next()
                        .expect("one fallback classification per unparsed commit");
                    let author = CommitAuthor {
                        name: commit.author_name.clone(),
                        email: commit.author_email.clone(),
                    };
                    let record = ConventionalCommit::from_classification(
                        commit.hash.as_str(),
                        &commit.message,
                        author,
                        commit.date,
                        &classification,
                    );
                    change_set.add(record, classification);
                }
            }
        }

        if change_set.is_empty() {
            return Err(SemanticDomainError::EmptyChangeSet.into());
        }

        let release_type = change_set.release_type()?;
        let next_version = self.calculator.next_version(&current_version, release_type);

        let run_id = RunId::generate(self.analyzer.config().fingerprint(tag_prefix.as_str()));
        let mut release = Release::new(
            run_id.clone(),
            branch,
            info.root.clone(),
            info.name(),
            &command.actor,
        );
        let commit_count = change_set.len();
        release.set_plan(
            ReleasePlan {
                current_version: current_version.clone(),
                next_version: next_version.clone(),
                release_type,
                change_set,
                dry_run: command.dry_run,
            },
            &command.actor,
        )?;

        self.store.persist(&release).await?;
        info!(
            run_id = run_id.as_str(),
            current = %current_version,
            next = %next_version,
            release_type = %release_type,
            dry_run = command.dry_run,
            "release planned"
        );

        Ok(PlanReleaseResult {
            run_id,
            current_version,
            next_version,
            release_type,
            commit_count,
            dry_run: command.dry_run,
        })
    }
}
