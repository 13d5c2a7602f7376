//! Approve use-case
//!
//! Gates on the aggregate's approval status, applies an optional inline
//! notes edit, and records who approved.

use crate::application::commands::{CommandHandler, ReleaseStore};
use crate::application::validation;
use crate::domains::releases::value_objects::{Approver, RunId};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ApproveReleaseCommand {
    pub run_id: String,
    pub approved_by: String,
    pub auto_approve: bool,
    /// Replacement notes text supplied by the approver
    pub edited_notes: Option<String>,
    pub actor: String,
}

impl ApproveReleaseCommand {
    pub fn new(run_id: impl Into<String>, approved_by: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            approved_by: approved_by.into(),
            auto_approve: false,
            edited_notes: None,
            actor: "release-engine".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApproveReleaseResult {
    pub run_id: RunId,
    pub approved_by: String,
    pub auto_approved: bool,
}

pub struct ApproveReleaseHandler {
    store: ReleaseStore,
}

impl ApproveReleaseHandler {
    pub fn new(store: ReleaseStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler<ApproveReleaseCommand> for ApproveReleaseHandler {
    type Output = ApproveReleaseResult;

    async fn handle(
        &self,
        command: ApproveReleaseCommand,
        _cancel: &CancellationToken,
    ) -> crate::Result<ApproveReleaseResult> {
        let run_id = validation::field("run id", RunId::new(command.run_id.clone()))?;
        let approver = Approver::new(command.approved_by.clone())?;

        let mut release = self.store.load(&run_id).await?;

        if let Some(text) = command.edited_notes {
            validation::require_notes_size(&text)?;
            release.update_notes_text(text, &command.actor)?;
        }

        release.approve(approver.clone(), command.auto_approve, &command.actor)?;
        self.store.persist(&release).await?;
        info!(
            run_id = run_id.as_str(),
            approved_by = approver.as_str(),
            auto = command.auto_approve,
            "release approved"
        );

        Ok(ApproveReleaseResult {
            run_id,
            approved_by: approver.as_str().to_string(),
            auto_approved: command.auto_approve,
        })
    }
}
