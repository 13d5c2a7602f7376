//! In-memory release storage and the unit-of-work implementation
//!
//! The store is a `RwLock<HashMap>` shared between the plain repository and
//! the unit-of-work factory. A unit of work stages saves locally; commit
//! writes the staged aggregates into the backing store (with their event
//! queues cleared), then publishes the collected events, so a subscriber
//! only ever sees events for state that is already visible in the store.

use crate::domains::releases::{
    entities::Release,
    errors::ReleaseDomainError,
    events::ReleaseEvent,
    repository::{
        EventPublisher, ReleaseRepository, ReleaseSpecification, UnitOfWork, UnitOfWorkFactory,
    },
    value_objects::{ReleaseState, RunId},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::warn;

type Store = Arc<RwLock<HashMap<String, Release>>>;

/// Optimistic-concurrency save shared by the repository and the unit of work
fn save_to_store(store: &Store, release: &Release) -> Result<(), ReleaseDomainError> {
    let mut guard = store.write().expect("release store lock");
    if let Some(existing) = guard.get(release.id().as_str()) {
        if existing.revision() != release.revision() {
            return Err(ReleaseDomainError::Conflict {
                id: release.id().to_string(),
            });
        }
    }
    let mut stored = release.clone();
    stored.bump_revision();
    guard.insert(release.id().as_str().to_string(), stored);
    Ok(())
}

fn conflict_check(store: &Store, release: &Release) -> Result<(), ReleaseDomainError> {
    let guard = store.read().expect("release store lock");
    if let Some(existing) = guard.get(release.id().as_str()) {
        if existing.revision() != release.revision() {
            return Err(ReleaseDomainError::Conflict {
                id: release.id().to_string(),
            });
        }
    }
    Ok(())
}

/// In-memory release repository
#[derive(Default)]
pub struct InMemoryReleaseRepository {
    store: Store,
}

impl InMemoryReleaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing store, for wiring a unit-of-work factory over the same data
    pub fn store(&self) -> Store {
        self.store.clone()
    }
}

#[async_trait]
impl ReleaseRepository for InMemoryReleaseRepository {
    async fn save(&self, release: &Release) -> Result<(), ReleaseDomainError> {
        save_to_store(&self.store, release)
    }

    async fn find_by_id(&self, id: &RunId) -> Result<Release, ReleaseDomainError> {
        let guard = self.store.read().expect("release store lock");
        guard
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ReleaseDomainError::NotFound { id: id.to_string() })
    }

    async fn find_latest(&self, repository_root: &Path) -> Result<Release, ReleaseDomainError> {
        let guard = self.store.read().expect("release store lock");
        guard
            .values()
            .filter(|r| r.repository_root() == repository_root)
            .max_by_key(|r| r.updated_at())
            .cloned()
            .ok_or_else(|| ReleaseDomainError::NotFound {
                id: repository_root.display().to_string(),
            })
    }

    async fn find_by_state(&self, state: ReleaseState) -> Result<Vec<Release>, ReleaseDomainError> {
        let guard = self.store.read().expect("release store lock");
        Ok(guard.values().filter(|r| r.state() == state).cloned().collect())
    }

    async fn find_active(&self) -> Result<Vec<Release>, ReleaseDomainError> {
        let guard = self.store.read().expect("release store lock");
        Ok(guard
            .values()
            .filter(|r| !r.state().is_terminal())
            .cloned()
            .collect())
    }

    async fn find_by_specification(
        &self,
        specification: &dyn ReleaseSpecification,
    ) -> Result<Vec<Release>, ReleaseDomainError> {
        let guard = self.store.read().expect("release store lock");
        Ok(guard
            .values()
            .filter(|r| specification.is_satisfied_by(r))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &RunId) -> Result<(), ReleaseDomainError> {
        let mut guard = self.store.write().expect("release store lock");
        guard
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| ReleaseDomainError::NotFound { id: id.to_string() })
    }
}

/// Repository view handed out by a unit of work: saves are staged until commit
struct StagingRepository {
    backing: Store,
    staged: RwLock<Vec<Release>>,
}

#[async_trait]
impl ReleaseRepository for StagingRepository {
    async fn save(&self, release: &Release) -> Result<(), ReleaseDomainError> {
        conflict_check(&self.backing, release)?;
        let mut staged = self.staged.write().expect("staging lock");
        staged.retain(|r| r.id() != release.id());
        staged.push(release.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RunId) -> Result<Release, ReleaseDomainError> {
        {
            let staged = self.staged.read().expect("staging lock");
            if let Some(found) = staged.iter().find(|r| r.id() == id) {
                return Ok(found.clone());
            }
        }
        let guard = self.backing.read().expect("release store lock");
        guard
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ReleaseDomainError::NotFound { id: id.to_string() })
    }

    async fn find_latest(&self, repository_root: &Path) -> Result<Release, ReleaseDomainError> {
        let guard = self.backing.read().expect("release store lock");
        guard
            .values()
            .filter(|r| r.repository_root() == repository_root)
            .max_by_key(|r| r.updated_at())
            .cloned()
            .ok_or_else(|| ReleaseDomainError::NotFound {
                id: repository_root.display().to_string(),
            })
    }

    async fn find_by_state(&self, state: ReleaseState) -> Result<Vec<Release>, ReleaseDomainError> {
        let guard = self.backing.read().expect("release store lock");
        Ok(guard.values().filter(|r| r.state() == state).cloned().collect())
    }

    async fn find_active(&self) -> Result<Vec<Release>, ReleaseDomainError> {
        let guard = self.backing.read().expect("release store lock");
        Ok(guard
            .values()
            .filter(|r| !r.state().is_terminal())
            .cloned()
            .collect())
    }

    async fn find_by_specification(
        &self,
        specification: &dyn ReleaseSpecification,
    ) -> Result<Vec<Release>, ReleaseDomainError> {
        let guard = self.backing.read().expect("release store lock");
        Ok(guard
            .values()
            .filter(|r| specification.is_satisfied_by(r))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &RunId) -> Result<(), ReleaseDomainError> {
        let mut staged = self.staged.write().expect("staging lock");
        staged.retain(|r| r.id() != id);
        drop(staged);
        let mut guard = self.backing.write().expect("release store lock");
        guard
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| ReleaseDomainError::NotFound { id: id.to_string() })
    }
}

/// In-memory unit of work.
///
/// Dropped without a commit, the staged saves simply disappear and no event
/// reaches the publisher.
pub struct InMemoryUnitOfWork {
    staging: Arc<StagingRepository>,
    publisher: Arc<dyn EventPublisher>,
    committed: bool,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn releases(&self) -> Arc<dyn ReleaseRepository> {
        self.staging.clone()
    }

    async fn commit(&mut self) -> Result<(), ReleaseDomainError> {
        if self.committed {
            return Ok(());
        }

        let staged: Vec<Release> = {
            let mut guard = self.staging.staged.write().expect("staging lock");
            std::mem::take(&mut *guard)
        };

        // Persist first, collect the queued events, then publish. The store
        // reflects the committed state before any subscriber hears of it.
        let mut events: Vec<ReleaseEvent> = Vec::new();
        for release in &staged {
            let mut stored = release.clone();
            events.extend(stored.domain_events().iter().cloned());
            stored.clear_domain_events();
            save_to_store(&self.staging.backing, &stored)?;
        }
        self.committed = true;

        if !events.is_empty() {
            if let Err(error) = self.publisher.publish(&events).await {
                // The state change is durable; events are at-least-once on
                // the happy path and lost only if the publisher itself fails.
                warn!("event publication failed after commit: {}", error);
            }
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), ReleaseDomainError> {
        if self.committed {
            return Ok(());
        }
        let mut guard = self.staging.staged.write().expect("staging lock");
        guard.clear();
        Ok(())
    }
}

/// Factory producing units of work over one shared store
pub struct InMemoryUnitOfWorkFactory {
    store: Store,
    publisher: Arc<dyn EventPublisher>,
}

impl InMemoryUnitOfWorkFactory {
    pub fn new(store: Store, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, ReleaseDomainError> {
        Ok(Box::new(InMemoryUnitOfWork {
            staging: Arc::new(StagingRepository {
                backing: self.store.clone(),
                staged: RwLock::new(Vec::new()),
            }),
            publisher: self.publisher.clone(),
            committed: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::git::value_objects::BranchName;
    use crate::domains::releases::value_objects::{ReleasePlan, RunId};
    use crate::domains::semantic::entities::ChangeSet;
    use crate::domains::semantic::value_objects::{ReleaseType, SemanticVersion};
    use crate::infrastructure::events::CollectingEventPublisher;
    use std::path::PathBuf;

    fn release(id: &str) -> Release {
        Release::new(
            RunId::new(id).unwrap(),
            BranchName::from_trusted("main"),
            PathBuf::from("/work/acme"),
            "acme",
            "tester",
        )
    }

    fn planned(id: &str) -> Release {
        let mut r = release(id);
        r.set_plan(
            ReleasePlan {
                current_version: SemanticVersion::parse("0.1.0").unwrap(),
                next_version: SemanticVersion::parse("0.2.0").unwrap(),
                release_type: ReleaseType::Minor,
                change_set: ChangeSet::new("cs", None, "HEAD"),
                dry_run: false,
            },
            "tester",
        )
        .unwrap();
        r
    }

    #[tokio::test]
    async fn save_and_find_round_trip() {
        let repo = InMemoryReleaseRepository::new();
        repo.save(&release("rel-1")).await.unwrap();
        let found = repo.find_by_id(&RunId::new("rel-1").unwrap()).await.unwrap();
        assert_eq!(found.id().as_str(), "rel-1");
    }

    #[tokio::test]
    async fn stale_revision_conflicts() {
        let repo = InMemoryReleaseRepository::new();
        let stale = release("rel-1");
        repo.save(&stale).await.unwrap();

        // First writer wins with the fresh copy, second save reuses the
        // original (now stale) revision.
        let fresh = repo.find_by_id(&RunId::new("rel-1").unwrap()).await.unwrap();
        repo.save(&fresh).await.unwrap();

        assert!(matches!(
            repo.save(&stale).await,
            Err(ReleaseDomainError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn find_active_excludes_terminal_states() {
        let repo = InMemoryReleaseRepository::new();
        repo.save(&release("rel-active")).await.unwrap();

        let mut failed = planned("rel-failed");
        failed
            .set_notes(
                crate::domains::releases::value_objects::ReleaseNotes::deterministic(
                    "n".to_string(),
                    "s".to_string(),
                ),
                "tester",
            )
            .unwrap();
        failed
            .approve(
                crate::domains::releases::value_objects::Approver::new("A").unwrap(),
                true,
                "tester",
            )
            .unwrap();
        failed.mark_failed("boom", "tester").unwrap();
        repo.save(&failed).await.unwrap();

        let active = repo.find_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id().as_str(), "rel-active");
    }

    #[tokio::test]
    async fn specification_queries_filter_by_predicate() {
        let repo = InMemoryReleaseRepository::new();
        repo.save(&release("rel-a")).await.unwrap();
        repo.save(&planned("rel-b")).await.unwrap();

        let versioned = repo
            .find_by_specification(&|r: &Release| r.state() == ReleaseState::Versioned)
            .await
            .unwrap();
        assert_eq!(versioned.len(), 1);
        assert_eq!(versioned[0].id().as_str(), "rel-b");
    }

    #[tokio::test]
    async fn commit_persists_then_publishes_and_clears_events() {
        let repo = InMemoryReleaseRepository::new();
        let publisher = Arc::new(CollectingEventPublisher::new());
        let factory = InMemoryUnitOfWorkFactory::new(repo.store(), publisher.clone());

        let planned = planned("rel-uow");
        assert_eq!(planned.domain_events().len(), 2);

        let mut uow = factory.begin().await.unwrap();
        uow.releases().save(&planned).await.unwrap();
        assert!(publisher.published().is_empty(), "no events before commit");

        uow.commit().await.unwrap();

        let stored = repo
            .find_by_id(&RunId::new("rel-uow").unwrap())
            .await
            .unwrap();
        assert!(stored.domain_events().is_empty(), "stored copy is cleared");
        let names: Vec<_> = publisher
            .published()
            .iter()
            .map(|e| e.kind.name())
            .collect();
        assert_eq!(names, vec!["ReleaseDrafted", "PlanSet"]);
    }

    #[tokio::test]
    async fn rollback_discards_staged_saves_and_publishes_nothing() {
        let repo = InMemoryReleaseRepository::new();
        let publisher = Arc::new(CollectingEventPublisher::new());
        let factory = InMemoryUnitOfWorkFactory::new(repo.store(), publisher.clone());

        let mut uow = factory.begin().await.unwrap();
        uow.releases().save(&planned("rel-rolled")).await.unwrap();
        uow.rollback().await.unwrap();
        // Safe to call again, and after a commit it is a no-op.
        uow.rollback().await.unwrap();

        assert!(publisher.published().is_empty());
        assert!(repo
            .find_by_id(&RunId::new("rel-rolled").unwrap())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn dropped_unit_of_work_publishes_nothing() {
        let repo = InMemoryReleaseRepository::new();
        let publisher = Arc::new(CollectingEventPublisher::new());
        let factory = InMemoryUnitOfWorkFactory::new(repo.store(), publisher.clone());

        {
            let uow = factory.begin().await.unwrap();
            uow.releases().save(&planned("rel-dropped")).await.unwrap();
        }

        assert!(publisher.published().is_empty());
        assert!(repo
            .find_by_id(&RunId::new("rel-dropped").unwrap())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn rollback_after_commit_keeps_the_commit() {
        let repo = InMemoryReleaseRepository::new();
        let publisher = Arc::new(CollectingEventPublisher::new());
        let factory = InMemoryUnitOfWorkFactory::new(repo.store(), publisher.clone());

        let mut uow = factory.begin().await.unwrap();
        uow.releases().save(&planned("rel-kept")).await.unwrap();
        uow.commit().await.unwrap();
        uow.rollback().await.unwrap();

        assert!(repo.find_by_id(&RunId::new("rel-kept").unwrap()).await.is_ok());
        assert_eq!(publisher.published().len(), 2);
    }
}
