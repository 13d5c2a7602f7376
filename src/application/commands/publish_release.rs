//! Publish use-case
//!
//! Three phases inside one invocation: pre-publish hooks (fatal on
//! failure), the git tag phase (idempotent against an existing tag, fatal
//! on push failure), and the post-publish hooks (recorded, never fatal).

use crate::application::commands::{CommandHandler, ReleaseStore};
use crate::application::validation;
use crate::domains::git::{
    repository::SourceControlPort,
    value_objects::{RemoteName, TagName, TagPrefix},
};
use crate::domains::plugins::{
    errors::PluginDomainError,
    repository::PluginExecutorPort,
    value_objects::{PluginHook, PluginResponse, ReleaseContext},
};
use crate::domains::releases::{
    entities::Release,
    errors::ReleaseDomainError,
    value_objects::{PluginExecutionRecord, PublishUrl, ReleaseState, RunId},
};
use crate::domains::semantic::value_objects::SemanticVersion;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PublishReleaseCommand {
    pub run_id: String,
    pub tag_prefix: String,
    pub create_tag: bool,
    pub push_tag: bool,
    /// Remote to push to; `origin` when unset
    pub remote: Option<String>,
    pub publish_url: Option<String>,
    pub dry_run: bool,
    pub actor: String,
}

impl PublishReleaseCommand {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            tag_prefix: "v".to_string(),
            create_tag: true,
            push_tag: true,
            remote: None,
            publish_url: None,
            dry_run: false,
            actor: "release-engine".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishReleaseResult {
    pub run_id: RunId,
    pub state: ReleaseState,
    pub tag_name: String,
    pub tag_created: bool,
    pub tag_pushed: bool,
    pub dry_run: bool,
}

pub struct PublishReleaseHandler {
    git: Arc<dyn SourceControlPort>,
    plugins: Arc<dyn PluginExecutorPort>,
    store: ReleaseStore,
}

impl PublishReleaseHandler {
    pub fn new(
        git: Arc<dyn SourceControlPort>,
        plugins: Arc<dyn PluginExecutorPort>,
        store: ReleaseStore,
    ) -> Self {
        Self {
            git,
            plugins,
            store,
        }
    }

    fn context(&self, release: &Release, tag_name: &TagName, version: &SemanticVersion, dry_run: bool) -> ReleaseContext {
        let plan = release.plan();
        ReleaseContext {
            version: version.to_string(),
            previous_version: plan.map(|p| p.current_version.to_string()),
            release_type: plan
                .map(|p| p.release_type.to_string())
                .unwrap_or_else(|| "patch".to_string()),
            repository_name: release.repository_name().to_string(),
            repository_path: release.repository_root().clone(),
            branch: release.branch().as_str().to_string(),
            tag_name: tag_name.as_str().to_string(),
            change_summary: plan
                .map(|p| p.change_set.summary())
                .unwrap_or_default(),
            changelog: release.notes().map(|n| n.text.clone()),
            release_notes: release.notes().map(|n| n.text.clone()),
            dry_run,
            timestamp: Utc::now(),
        }
    }

    fn record_responses(&self, release: &mut Release, hook: PluginHook, responses: &[PluginResponse]) {
        for response in responses {
            release.record_plugin_execution(PluginExecutionRecord {
                plugin_id: response.plugin_id.clone(),
                hook: hook.as_str().to_string(),
                success: response.success,
                message: response.message.clone().or_else(|| response.error.clone()),
                executed_at: Utc::now(),
            });
        }
    }

    /// Runs a hook whose failures are recorded but never abort the publish
    async fn run_lenient_hook(
        &self,
        release: &mut Release,
        hook: PluginHook,
        context: &ReleaseContext,
        cancel: &CancellationToken,
    ) {
        match self.plugins.execute_hook(hook, context, cancel).await {
            Ok(responses) => {
                for response in &responses {
                    if !response.success {
                        warn!(
                            hook = hook.as_str(),
                            plugin = response.plugin_id.as_str(),
                            "plugin reported failure: {:?}",
                            response.error
                        );
                    }
                }
                self.record_responses(release, hook, &responses);
            }
            Err(error) => {
                warn!(hook = hook.as_str(), "hook execution failed: {}", error);
                release.record_plugin_execution(PluginExecutionRecord {
                    plugin_id: "<host>".to_string(),
                    hook: hook.as_str().to_string(),
                    success: false,
                    message: Some(error.to_string()),
                    executed_at: Utc::now(),
                });
            }
        }
    }

    /// Marks the aggregate failed, runs the failure hooks, and persists
    async fn fail(
        &self,
        release: &mut Release,
        context: &ReleaseContext,
        reason: &str,
        actor: &str,
        cancel: &CancellationToken,
    ) {
        if let Err(error) = release.mark_failed(reason, actor) {
            warn!("could not mark release failed: {}", error);
        }
        self.run_lenient_hook(release, PluginHook::OnFailure, context, cancel)
            .await;
        if let Err(error) = self.store.persist(release).await {
            warn!("could not persist failed release: {}", error);
        }
    }
}

#[async_trait]
impl CommandHandler<PublishReleaseCommand> for PublishReleaseHandler {
    type Output = PublishReleaseResult;

    async fn handle(
        &self,
        command: PublishReleaseCommand,
        cancel: &CancellationToken,
    ) -> crate::Result<PublishReleaseResult> {
        let run_id = validation::field("run id", RunId::new(command.run_id.clone()))?;
        let tag_prefix = TagPrefix::new(command.tag_prefix.clone())?;
        let remote = match &command.remote {
            Some(name) => RemoteName::new(name.clone())?,
            None => RemoteName::default(),
        };
        let publish_url = command
            .publish_url
            .as_deref()
            .map(PublishUrl::new)
            .transpose()?;

        let mut release = self.store.load(&run_id).await?;
        if !release.can_proceed_to_publish() {
            return Err(ReleaseDomainError::InvalidTransition {
                from: release.state(),
                requested: "publish".to_string(),
            }
            .into());
        }

        let version = release
            .version()
            .cloned()
            .or_else(|| release.plan().map(|p| p.next_version.clone()))
            .ok_or_else(|| ReleaseDomainError::InvalidTransition {
                from: release.state(),
                requested: "publish".to_string(),
            })?;
        let tag_name = release
            .tag_name()
            .cloned()
            .unwrap_or_else(|| tag_prefix.tag_for(&version.to_string()));

        let context = self.context(&release, &tag_name, &version, command.dry_run);

        // Phase 1: pre-publish hooks are a gate. Any failure aborts before
        // the aggregate moves or git is touched.
        let pre_responses = self
            .plugins
            .execute_hook(PluginHook::PrePublish, &context, cancel)
            .await?;
        self.record_responses(&mut release, PluginHook::PrePublish, &pre_responses);
        if let Some(failed) = pre_responses.iter().find(|r| !r.success) {
            self.store.persist(&release).await?;
            return Err(PluginDomainError::HookFailed {
                hook: PluginHook::PrePublish.as_str().to_string(),
                plugin: failed.plugin_id.clone(),
                message: failed
                    .error
                    .clone()
                    .unwrap_or_else(|| "plugin rejected the release".to_string()),
            }
            .into());
        }

        // A dry run stops here: no transition, no tags, no pushes.
        if command.dry_run {
            self.store.persist(&release).await?;
            info!(run_id = run_id.as_str(), tag = tag_name.as_str(), "dry-run publish evaluated");
            return Ok(PublishReleaseResult {
                run_id,
                state: release.state(),
                tag_name: tag_name.as_str().to_string(),
                tag_created: false,
                tag_pushed: false,
                dry_run: true,
            });
        }

        release.start_publishing(&command.actor)?;

        // Phase 2: tag creation is idempotent against resumes; a tag that
        // already exists is reused untouched.
        let mut tag_created = false;
        if command.create_tag {
            match self.git.get_tag(&tag_name).await? {
                Some(existing) => {
                    info!(tag = existing.name.as_str(), "tag already exists, reusing");
                }
                None => {
                    let target = match self.git.get_latest_commit(release.branch()).await {
                        Ok(commit) => commit,
                        Err(error) => {
                            self.fail(&mut release, &context, &error.to_string(), &command.actor, cancel)
                                .await;
                            return Err(error.into());
                        }
                    };
                    let message = release
                        .notes()
                        .map(|n| n.summary.clone())
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| format!("Release {}", version));
                    if let Err(error) = self.git.create_tag(&tag_name, &target.hash, &message).await
                    {
                        self.fail(&mut release, &context, &error.to_string(), &command.actor, cancel)
                            .await;
                        return Err(error.into());
                    }
                    tag_created = true;
                }
            }
        }

        let mut tag_pushed = false;
        if command.push_tag {
            if let Err(error) = self.git.push_tag(&tag_name, &remote).await {
                self.fail(&mut release, &context, &error.to_string(), &command.actor, cancel)
                    .await;
                return Err(error.into());
            }
            tag_pushed = true;
        }

        // Phase 3: post hooks are best-effort, then the terminal transition,
        // then the success hooks.
        self.run_lenient_hook(&mut release, PluginHook::PostPublish, &context, cancel)
            .await;

        release.mark_published(publish_url, &command.actor)?;

        self.run_lenient_hook(&mut release, PluginHook::OnSuccess, &context, cancel)
            .await;

        self.store.persist(&release).await?;
        info!(
            run_id = run_id.as_str(),
            tag = tag_name.as_str(),
            created = tag_created,
            pushed = tag_pushed,
            "release published"
        );

        Ok(PublishReleaseResult {
            run_id,
            state: release.state(),
            tag_name: tag_name.as_str().to_string(),
            tag_created,
            tag_pushed,
            dry_run: false,
        })
    }
}
