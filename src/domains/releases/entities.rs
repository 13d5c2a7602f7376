//! The release aggregate
//!
//! All mutation happens through explicit transition methods that enforce the
//! state machine and append domain events. Once a release is Published or
//! Failed it is an immutable audit record.

use crate::domains::git::value_objects::{BranchName, TagName};
use crate::domains::releases::{
    errors::ReleaseDomainError,
    events::{ReleaseEvent, ReleaseEventKind},
    value_objects::{
        ApprovalStatus, Approver, PluginExecutionRecord, PublishUrl, ReleaseNotes, ReleasePlan,
        ReleaseState, RunId, NOTES_MAX_BYTES,
    },
};
use crate::domains::semantic::value_objects::SemanticVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Aggregate root for one release run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    id: RunId,
    branch: BranchName,
    repository_root: PathBuf,
    repository_name: String,
    state: ReleaseState,
    version: Option<SemanticVersion>,
    tag_name: Option<TagName>,
    plan: Option<ReleasePlan>,
    notes: Option<ReleaseNotes>,
    approved_by: Option<Approver>,
    auto_approved: bool,
    approved_at: Option<DateTime<Utc>>,
    publish_url: Option<PublishUrl>,
    failure_reason: Option<String>,
    plugin_records: Vec<PluginExecutionRecord>,
    #[serde(default)]
    events: Vec<ReleaseEvent>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Optimistic-concurrency marker maintained by repositories
    revision: u64,
}

impl Release {
    pub fn new(
        id: RunId,
        branch: BranchName,
        repository_root: PathBuf,
        repository_name: impl Into<String>,
        actor: &str,
    ) -> Self {
        let now = Utc::now();
        let mut release = Self {
            id: id.clone(),
            branch,
            repository_root,
            repository_name: repository_name.into(),
            state: ReleaseState::Draft,
            version: None,
            tag_name: None,
            plan: None,
            notes: None,
            approved_by: None,
            auto_approved: false,
            approved_at: None,
            publish_url: None,
            failure_reason: None,
            plugin_records: Vec::new(),
            events: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 0,
        };
        release.record(ReleaseEventKind::ReleaseDrafted, actor);
        release
    }

    // Accessors

    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    pub fn repository_root(&self) -> &PathBuf {
        &self.repository_root
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    pub fn state(&self) -> ReleaseState {
        self.state
    }

    pub fn version(&self) -> Option<&SemanticVersion> {
        self.version.as_ref()
    }

    pub fn tag_name(&self) -> Option<&TagName> {
        self.tag_name.as_ref()
    }

    pub fn plan(&self) -> Option<&ReleasePlan> {
        self.plan.as_ref()
    }

    pub fn notes(&self) -> Option<&ReleaseNotes> {
        self.notes.as_ref()
    }

    pub fn approved_by(&self) -> Option<&Approver> {
        self.approved_by.as_ref()
    }

    pub fn auto_approved(&self) -> bool {
        self.auto_approved
    }

    pub fn publish_url(&self) -> Option<&PublishUrl> {
        self.publish_url.as_ref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn plugin_records(&self) -> &[PluginExecutionRecord] {
        &self.plugin_records
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    // Transitions

    /// Draft → Versioned, attaching the computed plan
    pub fn set_plan(&mut self, plan: ReleasePlan, actor: &str) -> Result<(), ReleaseDomainError> {
        self.guard(&[ReleaseState::Draft], "set plan")?;

        let event = ReleaseEventKind::PlanSet {
            current_version: plan.current_version.to_string(),
            next_version: plan.next_version.to_string(),
            release_type: plan.release_type,
            commit_count: plan.change_set.len(),
            dry_run: plan.dry_run,
        };
        self.plan = Some(plan);
        self.state = ReleaseState::Versioned;
        self.record(event, actor);
        Ok(())
    }

    /// Pins the version (and tag) to release, overriding the plan's next
    /// version. Allowed until notes are approved.
    pub fn set_version(
        &mut self,
        version: SemanticVersion,
        tag_name: TagName,
    ) -> Result<(), ReleaseDomainError> {
        self.guard(
            &[ReleaseState::Versioned, ReleaseState::NotesGenerated],
            "set version",
        )?;
        self.version = Some(version);
        self.tag_name = Some(tag_name);
        self.touch();
        Ok(())
    }

    /// Versioned → NotesGenerated
    pub fn set_notes(&mut self, notes: ReleaseNotes, actor: &str) -> Result<(), ReleaseDomainError> {
        self.guard(&[ReleaseState::Versioned], "generate notes")?;

        let event = ReleaseEventKind::NotesGenerated {
            ai_generated: notes.ai_generated,
            provider: notes.provider.clone(),
        };
        self.notes = Some(notes);
        self.state = ReleaseState::NotesGenerated;
        self.record(event, actor);
        Ok(())
    }

    /// In-place edit of the notes text while still in NotesGenerated
    pub fn update_notes_text(&mut self, text: String, actor: &str) -> Result<(), ReleaseDomainError> {
        self.guard(&[ReleaseState::NotesGenerated], "edit notes")?;
        if text.len() > NOTES_MAX_BYTES {
            return Err(ReleaseDomainError::NotesTooLarge {
                limit_bytes: NOTES_MAX_BYTES,
            });
        }
        let notes = self
            .notes
            .as_mut()
            .expect("NotesGenerated implies notes are present");
        notes.text = text;
        self.record(ReleaseEventKind::NotesEdited, actor);
        Ok(())
    }

    /// Pure accessor telling callers whether approval is possible right now
    pub fn approval_status(&self) -> ApprovalStatus {
        match self.state {
            ReleaseState::NotesGenerated => ApprovalStatus {
                can_approve: true,
                reason: String::new(),
            },
            ReleaseState::Approved => ApprovalStatus {
                can_approve: false,
                reason: "already approved".to_string(),
            },
            _ => ApprovalStatus {
                can_approve: false,
                reason: "not ready for approval".to_string(),
            },
        }
    }

    /// NotesGenerated → Approved
    pub fn approve(
        &mut self,
        approver: Approver,
        auto_approved: bool,
        actor: &str,
    ) -> Result<(), ReleaseDomainError> {
        let status = self.approval_status();
        if !status.can_approve {
            return Err(ReleaseDomainError::NotReadyForApproval {
                reason: status.reason,
            });
        }

        let event = ReleaseEventKind::ReleaseApproved {
            approved_by: approver.as_str().to_string(),
            auto_approved,
        };
        self.approved_by = Some(approver);
        self.auto_approved = auto_approved;
        self.approved_at = Some(Utc::now());
        self.state = ReleaseState::Approved;
        self.record(event, actor);
        Ok(())
    }

    pub fn can_proceed_to_publish(&self) -> bool {
        self.state == ReleaseState::Approved
    }

    /// Approved → Publishing
    pub fn start_publishing(&mut self, actor: &str) -> Result<(), ReleaseDomainError> {
        self.guard(&[ReleaseState::Approved], "start publishing")?;
        self.state = ReleaseState::Publishing;
        self.record(ReleaseEventKind::PublishingStarted, actor);
        Ok(())
    }

    /// Publishing → Published (terminal)
    pub fn mark_published(
        &mut self,
        url: Option<PublishUrl>,
        actor: &str,
    ) -> Result<(), ReleaseDomainError> {
        self.guard(&[ReleaseState::Publishing], "mark published")?;

        let event = ReleaseEventKind::ReleasePublished {
            tag_name: self.tag_name.as_ref().map(|t| t.as_str().to_string()),
            url: url.as_ref().map(|u| u.as_str().to_string()),
        };
        self.publish_url = url;
        self.state = ReleaseState::Published;
        self.record(event, actor);
        Ok(())
    }

    /// Approved | Publishing → Failed (terminal)
    pub fn mark_failed(&mut self, reason: impl Into<String>, actor: &str) -> Result<(), ReleaseDomainError> {
        self.guard(
            &[ReleaseState::Approved, ReleaseState::Publishing],
            "mark failed",
        )?;
        let reason = reason.into();
        self.failure_reason = Some(reason.clone());
        self.state = ReleaseState::Failed;
        self.record(ReleaseEventKind::ReleaseFailed { reason }, actor);
        Ok(())
    }

    /// Appends the outcome of one plugin invocation to the audit log
    pub fn record_plugin_execution(&mut self, record: PluginExecutionRecord) {
        self.plugin_records.push(record);
        self.touch();
    }

    // Domain events

    /// Events queued since the last clear, in transition order
    pub fn domain_events(&self) -> &[ReleaseEvent] {
        &self.events
    }

    /// Normally called by the unit of work after publication
    pub fn clear_domain_events(&mut self) {
        self.events.clear();
    }

    fn guard(&self, allowed: &[ReleaseState], requested: &str) -> Result<(), ReleaseDomainError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ReleaseDomainError::InvalidTransition {
                from: self.state,
                requested: requested.to_string(),
            })
        }
    }

    fn record(&mut self, kind: ReleaseEventKind, actor: &str) {
        self.events
            .push(ReleaseEvent::new(self.id.clone(), kind, actor));
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::semantic::entities::ChangeSet;
    use crate::domains::semantic::value_objects::ReleaseType;

    fn plan(dry_run: bool) -> ReleasePlan {
        ReleasePlan {
            current_version: SemanticVersion::parse("0.1.0").unwrap(),
            next_version: SemanticVersion::parse("0.2.0").unwrap(),
            release_type: ReleaseType::Minor,
            change_set: ChangeSet::new("cs", None, "HEAD"),
            dry_run,
        }
    }

    fn notes() -> ReleaseNotes {
        ReleaseNotes::deterministic("## 0.2.0".to_string(), "one feature".to_string())
    }

    fn draft() -> Release {
        Release::new(
            RunId::new("rel-test-1").unwrap(),
            BranchName::from_trusted("main"),
            PathBuf::from("/work/acme"),
            "acme",
            "tester",
        )
    }

    fn approved() -> Release {
        let mut release = draft();
        release.set_plan(plan(false), "tester").unwrap();
        release.set_notes(notes(), "tester").unwrap();
        release
            .approve(Approver::new("Riley").unwrap(), false, "tester")
            .unwrap();
        release
    }

    #[test]
    fn happy_path_walks_every_state() {
        let mut release = draft();
        assert_eq!(release.state(), ReleaseState::Draft);

        release.set_plan(plan(false), "tester").unwrap();
        assert_eq!(release.state(), ReleaseState::Versioned);

        release.set_notes(notes(), "tester").unwrap();
        assert_eq!(release.state(), ReleaseState::NotesGenerated);

        release
            .approve(Approver::new("Riley").unwrap(), false, "tester")
            .unwrap();
        assert_eq!(release.state(), ReleaseState::Approved);
        assert!(release.can_proceed_to_publish());

        release.start_publishing("tester").unwrap();
        assert_eq!(release.state(), ReleaseState::Publishing);

        release.mark_published(None, "tester").unwrap();
        assert_eq!(release.state(), ReleaseState::Published);
    }

    #[test]
    fn events_follow_transition_order() {
        let mut release = approved();
        release.start_publishing("tester").unwrap();
        release.mark_published(None, "tester").unwrap();

        let names: Vec<_> = release
            .domain_events()
            .iter()
            .map(|e| e.kind.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "ReleaseDrafted",
                "PlanSet",
                "NotesGenerated",
                "ReleaseApproved",
                "PublishingStarted",
                "ReleasePublished",
            ]
        );
    }

    #[test]
    fn skipping_states_is_rejected() {
        let mut release = draft();
        assert!(matches!(
            release.set_notes(notes(), "tester"),
            Err(ReleaseDomainError::InvalidTransition { .. })
        ));
        assert!(matches!(
            release.start_publishing("tester"),
            Err(ReleaseDomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn terminal_states_refuse_all_transitions() {
        let mut release = approved();
        release.start_publishing("tester").unwrap();
        release.mark_published(None, "tester").unwrap();

        assert!(release.set_plan(plan(false), "tester").is_err());
        assert!(release.set_notes(notes(), "tester").is_err());
        assert!(release
            .approve(Approver::new("X").unwrap(), false, "tester")
            .is_err());
        assert!(release.start_publishing("tester").is_err());
        assert!(release.mark_failed("late failure", "tester").is_err());

        let mut failed = approved();
        failed.mark_failed("push rejected", "tester").unwrap();
        assert!(failed.start_publishing("tester").is_err());
        assert!(failed.mark_published(None, "tester").is_err());
    }

    #[test]
    fn approval_status_reflects_state() {
        let mut release = draft();
        assert!(!release.approval_status().can_approve);
        assert_eq!(release.approval_status().reason, "not ready for approval");

        release.set_plan(plan(false), "tester").unwrap();
        release.set_notes(notes(), "tester").unwrap();
        assert!(release.approval_status().can_approve);

        release
            .approve(Approver::new("Riley").unwrap(), false, "tester")
            .unwrap();
        let status = release.approval_status();
        assert!(!status.can_approve);
        assert_eq!(status.reason, "already approved");
    }

    #[test]
    fn second_approval_reports_already_approved() {
        let mut release = approved();
        let err = release
            .approve(Approver::new("Riley").unwrap(), false, "tester")
            .unwrap_err();
        assert!(err.to_string().contains("already approved"));
    }

    #[test]
    fn notes_can_be_edited_only_before_approval() {
        let mut release = draft();
        release.set_plan(plan(false), "tester").unwrap();
        release.set_notes(notes(), "tester").unwrap();

        release
            .update_notes_text("## edited".to_string(), "tester")
            .unwrap();
        assert_eq!(release.notes().unwrap().text, "## edited");
        assert_eq!(
            release.domain_events().last().unwrap().kind.name(),
            "NotesEdited"
        );

        release
            .approve(Approver::new("Riley").unwrap(), false, "tester")
            .unwrap();
        assert!(release
            .update_notes_text("## too late".to_string(), "tester")
            .is_err());
    }

    #[test]
    fn oversized_notes_edits_are_rejected() {
        let mut release = draft();
        release.set_plan(plan(false), "tester").unwrap();
        release.set_notes(notes(), "tester").unwrap();

        let oversized = "x".repeat(NOTES_MAX_BYTES + 1);
        assert!(matches!(
            release.update_notes_text(oversized, "tester"),
            Err(ReleaseDomainError::NotesTooLarge { .. })
        ));
    }

    #[test]
    fn failure_keeps_the_reason() {
        let mut release = approved();
        release.start_publishing("tester").unwrap();
        release.mark_failed("tag push rejected", "tester").unwrap();
        assert_eq!(release.state(), ReleaseState::Failed);
        assert_eq!(release.failure_reason(), Some("tag push rejected"));
    }

    #[test]
    fn clear_domain_events_empties_the_queue() {
        let mut release = draft();
        release.set_plan(plan(true), "tester").unwrap();
        assert_eq!(release.domain_events().len(), 2);
        release.clear_domain_events();
        assert!(release.domain_events().is_empty());
    }

    #[test]
    fn aggregate_round_trips_through_serde() {
        let mut release = approved();
        release.record_plugin_execution(PluginExecutionRecord {
            plugin_id: "notifier".to_string(),
            hook: "post_publish".to_string(),
            success: true,
            message: None,
            executed_at: Utc::now(),
        });

        let json = serde_json::to_string(&release).unwrap();
        let restored: Release = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), release.state());
        assert_eq!(restored.id(), release.id());
        assert_eq!(restored.plugin_records().len(), 1);
        assert_eq!(
            restored.plan().unwrap().next_version,
            release.plan().unwrap().next_version
        );
    }
}
