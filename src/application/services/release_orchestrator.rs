//! Release orchestrator
//!
//! Facade wiring the four use-case handlers over one set of ports. Each
//! release moves through plan → generate notes → approve → publish, every
//! step persisting through the shared store.

use crate::application::commands::{
    ApproveReleaseCommand, ApproveReleaseHandler, ApproveReleaseResult, CommandHandler,
    GenerateNotesCommand, GenerateNotesHandler, GenerateNotesResult, PlanReleaseCommand,
    PlanReleaseHandler, PlanReleaseResult, PublishReleaseCommand, PublishReleaseHandler,
    PublishReleaseResult, ReleaseStore,
};
use crate::domains::ai::repository::AiServicePort;
use crate::domains::analysis::services::CommitAnalyzer;
use crate::domains::git::repository::SourceControlPort;
use crate::domains::plugins::repository::PluginExecutorPort;
use crate::domains::semantic::repository::VersionCalculatorPort;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct ReleaseOrchestrator {
    plan: PlanReleaseHandler,
    notes: GenerateNotesHandler,
    approve: ApproveReleaseHandler,
    publish: PublishReleaseHandler,
}

impl ReleaseOrchestrator {
    pub fn new(
        git: Arc<dyn SourceControlPort>,
        analyzer: Arc<CommitAnalyzer>,
        calculator: Arc<dyn VersionCalculatorPort>,
        ai: Arc<dyn AiServicePort>,
        plugins: Arc<dyn PluginExecutorPort>,
        store: ReleaseStore,
    ) -> Self {
        Self {
            plan: PlanReleaseHandler::new(git.clone(), analyzer, calculator, store.clone()),
            notes: GenerateNotesHandler::new(ai, store.clone()),
            approve: ApproveReleaseHandler::new(store.clone()),
            publish: PublishReleaseHandler::new(git, plugins, store),
        }
    }

    pub async fn plan(
        &self,
        command: PlanReleaseCommand,
        cancel: &CancellationToken,
    ) -> crate::Result<PlanReleaseResult> {
        self.plan.handle(command, cancel).await
    }

    pub async fn generate_notes(
        &self,
        command: GenerateNotesCommand,
        cancel: &CancellationToken,
    ) -> crate::Result<GenerateNotesResult> {
        self.notes.handle(command, cancel).await
    }

    pub async fn approve(
        &self,
        command: ApproveReleaseCommand,
        cancel: &CancellationToken,
    ) -> crate::Result<ApproveReleaseResult> {
        self.approve.handle(command, cancel).await
    }

    pub async fn publish(
        &self,
        command: PublishReleaseCommand,
        cancel: &CancellationToken,
    ) -> crate::Result<PublishReleaseResult> {
        self.publish.handle(command, cancel).await
    }
}
