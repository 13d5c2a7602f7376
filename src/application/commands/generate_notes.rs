//! Generate-notes use-case
//!
//! Renders release notes for a planned release. The AI path is optional
//! and best-effort: any provider failure logs a warning and falls back to
//! the deterministic composer, never surfacing an error to the caller.

use crate::application::commands::{CommandHandler, ReleaseStore};
use crate::application::validation;
use crate::domains::ai::{
    repository::AiServicePort,
    value_objects::{Audience, ChangeLine, GenerationRequest, Tone},
};
use crate::domains::releases::{
    errors::ReleaseDomainError,
    services::NotesComposer,
    value_objects::{ReleaseNotes, ReleasePlan, RunId},
};
use crate::domains::semantic::entities::ChangeSet;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct GenerateNotesCommand {
    pub run_id: String,
    pub use_ai: bool,
    pub tone: Tone,
    pub audience: Audience,
    /// Append the deterministic changelog section below AI-written notes
    pub include_changelog: bool,
    pub actor: String,
}

impl GenerateNotesCommand {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            use_ai: false,
            tone: Tone::default(),
            audience: Audience::default(),
            include_changelog: false,
            actor: "release-engine".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateNotesResult {
    pub run_id: RunId,
    pub notes: ReleaseNotes,
}

pub struct GenerateNotesHandler {
    ai: Arc<dyn AiServicePort>,
    composer: NotesComposer,
    store: ReleaseStore,
}

impl GenerateNotesHandler {
    pub fn new(ai: Arc<dyn AiServicePort>, store: ReleaseStore) -> Self {
        Self {
            ai,
            composer: NotesComposer::new(),
            store,
        }
    }

    fn generation_request(&self, plan: &ReleasePlan, repository_name: &str, version: &str, command: &GenerateNotesCommand) -> GenerationRequest {
        GenerationRequest {
            repository_name: repository_name.to_string(),
            version: version.to_string(),
            previous_version: Some(plan.current_version.to_string()),
            release_type: plan.release_type.to_string(),
            tone_guidance: String::new(),
            audience_guidance: String::new(),
            changes: change_lines(&plan.change_set),
        }
        .with_voice(command.tone, command.audience)
    }
}

#[async_trait]
impl CommandHandler<GenerateNotesCommand> for GenerateNotesHandler {
    type Output = GenerateNotesResult;

    async fn handle(
        &self,
        command: GenerateNotesCommand,
        cancel: &CancellationToken,
    ) -> crate::Result<GenerateNotesResult> {
        let run_id = validation::field("run id", RunId::new(command.run_id.clone()))?;
        let mut release = self.store.load(&run_id).await?;

        let plan = release
            .plan()
            .cloned()
            .ok_or_else(|| ReleaseDomainError::InvalidTransition {
                from: release.state(),
                requested: "generate notes".to_string(),
            })?;

        // An explicitly pinned version wins over the plan's next version.
        let version = release
            .version()
            .cloned()
            .unwrap_or_else(|| plan.next_version.clone());

        let deterministic = self.composer.compose(&version, &plan.change_set);

        let notes = if command.use_ai && self.ai.is_available() {
            let request =
                self.generation_request(&plan, release.repository_name(), &version.to_string(), &command);
            match self.ai.generate_release_notes(&request, cancel).await {
                Ok(text) if !text.is_empty() => {
                    let mut text = text;
                    if command.include_changelog {
                        text.push_str("\n\n");
                        text.push_str(&self.composer.changelog_section(&version, &plan.change_set));
                    }
                    ReleaseNotes::ai(text, plan.change_set.summary(), "ai")
                }
                Ok(_) => deterministic,
                Err(error) => {
                    warn!(
                        run_id = run_id.as_str(),
                        "AI notes generation failed, using deterministic notes: {}", error
                    );
                    deterministic
                }
            }
        } else {
            deterministic
        };

        release.set_notes(notes.clone(), &command.actor)?;
        self.store.persist(&release).await?;
        info!(
            run_id = run_id.as_str(),
            ai_generated = notes.ai_generated,
            "release notes generated"
        );

        Ok(GenerateNotesResult { run_id, notes })
    }
}

/// Flattens a changeset into the lines the prompt templates iterate
pub fn change_lines(change_set: &ChangeSet) -> Vec<ChangeLine> {
    change_set
        .commits()
        .iter()
        .map(|commit| ChangeLine {
            commit_type: commit.commit_type.as_str().to_string(),
            scope: commit.scope.clone(),
            subject: commit.subject.clone(),
            breaking: commit.breaking,
        })
        .collect()
}
