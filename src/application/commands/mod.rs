//! Use-case command handlers
//!
//! One module per write operation on a release. Handlers share the
//! [`ReleaseStore`] persistence helper: transactional through a unit of
//! work when a factory is wired, legacy direct save otherwise.

use crate::domains::releases::{
    entities::Release,
    repository::{EventPublisher, ReleaseRepository, UnitOfWorkFactory},
    value_objects::RunId,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub mod approve_release;
pub mod generate_notes;
pub mod plan_release;
pub mod publish_release;

pub use approve_release::*;
pub use generate_notes::*;
pub use plan_release::*;
pub use publish_release::*;

/// Common shape of a use-case handler
#[async_trait]
pub trait CommandHandler<C>: Send + Sync {
    type Output: Send;

    async fn handle(&self, command: C, cancel: &CancellationToken) -> crate::Result<Self::Output>;
}

/// Persistence used by every handler.
///
/// With a unit-of-work factory, each persist brackets the save and the
/// atomic event publication in one transaction. Without one, the handler
/// falls back to a direct save with best-effort event publication.
#[derive(Clone)]
pub struct ReleaseStore {
    repository: Arc<dyn ReleaseRepository>,
    publisher: Arc<dyn EventPublisher>,
    uow_factory: Option<Arc<dyn UnitOfWorkFactory>>,
}

impl ReleaseStore {
    pub fn new(
        repository: Arc<dyn ReleaseRepository>,
        publisher: Arc<dyn EventPublisher>,
        uow_factory: Option<Arc<dyn UnitOfWorkFactory>>,
    ) -> Self {
        Self {
            repository,
            publisher,
            uow_factory,
        }
    }

    pub async fn load(&self, id: &RunId) -> crate::Result<Release> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn persist(&self, release: &Release) -> crate::Result<()> {
        match &self.uow_factory {
            Some(factory) => {
                let mut uow = factory.begin().await?;
                if let Err(error) = uow.releases().save(release).await {
                    let _ = uow.rollback().await;
                    return Err(error.into());
                }
                uow.commit().await?;
            }
            None => {
                self.repository.save(release).await?;
                // Events are best-effort on the legacy path; the state
                // change is already durable.
                if let Err(error) = self.publisher.publish(release.domain_events()).await {
                    warn!("event publication failed after save: {}", error);
                }
            }
        }
        Ok(())
    }
}
