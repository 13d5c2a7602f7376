//! Release persistence ports
//!
//! The repository stores aggregates; the unit of work brackets a set of
//! saves so the state change and its domain events land together. Callers
//! begin a unit of work, save through its repository view, and either
//! commit or let it drop; a dropped, uncommitted unit of work publishes
//! nothing.

use crate::domains::releases::{
    entities::Release,
    errors::ReleaseDomainError,
    events::ReleaseEvent,
    value_objects::{ReleaseState, RunId},
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Predicate-style query over releases
pub trait ReleaseSpecification: Send + Sync {
    fn is_satisfied_by(&self, release: &Release) -> bool;
}

impl<F> ReleaseSpecification for F
where
    F: Fn(&Release) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, release: &Release) -> bool {
        self(release)
    }
}

/// Store of release aggregates keyed by run id
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    /// Persists an aggregate. Fails with `Conflict` when another writer
    /// saved a newer revision first.
    async fn save(&self, release: &Release) -> Result<(), ReleaseDomainError>;

    async fn find_by_id(&self, id: &RunId) -> Result<Release, ReleaseDomainError>;

    /// Most recently updated release for a repository root
    async fn find_latest(&self, repository_root: &Path) -> Result<Release, ReleaseDomainError>;

    async fn find_by_state(&self, state: ReleaseState) -> Result<Vec<Release>, ReleaseDomainError>;

    /// Releases not yet in a terminal state
    async fn find_active(&self) -> Result<Vec<Release>, ReleaseDomainError>;

    async fn find_by_specification(
        &self,
        specification: &dyn ReleaseSpecification,
    ) -> Result<Vec<Release>, ReleaseDomainError>;

    async fn delete(&self, id: &RunId) -> Result<(), ReleaseDomainError>;
}

/// Sink for committed domain events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), ReleaseDomainError>;
}

/// One transactional scope
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Repository view whose saves are staged until commit
    fn releases(&self) -> Arc<dyn ReleaseRepository>;

    /// Persists every staged aggregate, then publishes their queued events,
    /// then clears them. Subscribers observe events only after the store
    /// reflects the committed state.
    async fn commit(&mut self) -> Result<(), ReleaseDomainError>;

    /// Discards staged work. Idempotent, and a no-op after a commit.
    async fn rollback(&mut self) -> Result<(), ReleaseDomainError>;
}

/// Creates units of work over a shared backing store
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, ReleaseDomainError>;
}
