//! Release domain events
//!
//! Every state transition on the aggregate appends one of these. Events
//! stay queued on the aggregate until the unit of work publishes them
//! atomically with the persisted state change.

use crate::domains::releases::value_objects::RunId;
use crate::domains::semantic::value_objects::ReleaseType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReleaseEventKind {
    ReleaseDrafted,
    PlanSet {
        current_version: String,
        next_version: String,
        release_type: ReleaseType,
        commit_count: usize,
        dry_run: bool,
    },
    NotesGenerated {
        ai_generated: bool,
        provider: String,
    },
    NotesEdited,
    ReleaseApproved {
        approved_by: String,
        auto_approved: bool,
    },
    PublishingStarted,
    ReleasePublished {
        tag_name: Option<String>,
        url: Option<String>,
    },
    ReleaseFailed {
        reason: String,
    },
}

impl ReleaseEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReleaseDrafted => "ReleaseDrafted",
            Self::PlanSet { .. } => "PlanSet",
            Self::NotesGenerated { .. } => "NotesGenerated",
            Self::NotesEdited => "NotesEdited",
            Self::ReleaseApproved { .. } => "ReleaseApproved",
            Self::PublishingStarted => "PublishingStarted",
            Self::ReleasePublished { .. } => "ReleasePublished",
            Self::ReleaseFailed { .. } => "ReleaseFailed",
        }
    }
}

/// One event with identity, ordering timestamp, and the acting party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub id: Uuid,
    pub run_id: RunId,
    pub kind: ReleaseEventKind,
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
}

impl ReleaseEvent {
    pub fn new(run_id: RunId, kind: ReleaseEventKind, actor: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id,
            kind,
            actor: actor.into(),
            occurred_at: Utc::now(),
        }
    }
}
