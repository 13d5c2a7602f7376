//! JSON-file release repository
//!
//! One document per release, keyed by run id, written atomically so a crash
//! mid-save leaves the previous document intact. This is what makes resume
//! across restarts possible.

use crate::domains::releases::{
    entities::Release,
    errors::ReleaseDomainError,
    repository::{ReleaseRepository, ReleaseSpecification},
    value_objects::{ReleaseState, RunId},
};
use crate::utils::{atomic_write_file, read_file_limited};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

const DOCUMENT_MODE: u32 = 0o644;
/// More than enough for any plan + notes at the 1 MiB notes cap
const DOCUMENT_MAX_BYTES: u64 = 8 * 1024 * 1024;

/// Directory-backed release repository
pub struct FileReleaseRepository {
    base_dir: PathBuf,
}

impl FileReleaseRepository {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, ReleaseDomainError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .map_err(|e| ReleaseDomainError::storage(format!("create {}: {}", base_dir.display(), e)))?;
        Ok(Self { base_dir })
    }

    fn document_path(&self, id: &RunId) -> PathBuf {
        self.base_dir.join(format!("{}.json", id.as_str()))
    }

    fn read_document(&self, path: &Path) -> Result<Release, ReleaseDomainError> {
        let bytes = read_file_limited(path, DOCUMENT_MAX_BYTES)
            .map_err(|e| ReleaseDomainError::storage(format!("read {}: {}", path.display(), e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ReleaseDomainError::storage(format!("decode {}: {}", path.display(), e)))
    }

    fn scan(&self) -> Result<Vec<Release>, ReleaseDomainError> {
        let entries = fs::read_dir(&self.base_dir)
            .map_err(|e| ReleaseDomainError::storage(format!("scan {}: {}", self.base_dir.display(), e)))?;

        let mut releases = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| ReleaseDomainError::storage(format!("scan entry: {}", e)))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            releases.push(self.read_document(&path)?);
        }
        Ok(releases)
    }
}

#[async_trait]
impl ReleaseRepository for FileReleaseRepository {
    async fn save(&self, release: &Release) -> Result<(), ReleaseDomainError> {
        let path = self.document_path(release.id());

        if path.exists() {
            let existing = self.read_document(&path)?;
            if existing.revision() != release.revision() {
                return Err(ReleaseDomainError::Conflict {
                    id: release.id().to_string(),
                });
            }
        }

        let mut stored = release.clone();
        stored.bump_revision();
        let bytes = serde_json::to_vec_pretty(&stored)
            .map_err(|e| ReleaseDomainError::storage(format!("encode release: {}", e)))?;
        atomic_write_file(&path, &bytes, DOCUMENT_MODE)
            .map_err(|e| ReleaseDomainError::storage(format!("write {}: {}", path.display(), e)))
    }

    async fn find_by_id(&self, id: &RunId) -> Result<Release, ReleaseDomainError> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(ReleaseDomainError::NotFound { id: id.to_string() });
        }
        self.read_document(&path)
    }

    async fn find_latest(&self, repository_root: &Path) -> Result<Release, ReleaseDomainError> {
        self.scan()?
            .into_iter()
            .filter(|r| r.repository_root() == repository_root)
            .max_by_key(|r| r.updated_at())
            .ok_or_else(|| ReleaseDomainError::NotFound {
                id: repository_root.display().to_string(),
            })
    }

    async fn find_by_state(&self, state: ReleaseState) -> Result<Vec<Release>, ReleaseDomainError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|r| r.state() == state)
            .collect())
    }

    async fn find_active(&self) -> Result<Vec<Release>, ReleaseDomainError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|r| !r.state().is_terminal())
            .collect())
    }

    async fn find_by_specification(
        &self,
        specification: &dyn ReleaseSpecification,
    ) -> Result<Vec<Release>, ReleaseDomainError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|r| specification.is_satisfied_by(r))
            .collect())
    }

    async fn delete(&self, id: &RunId) -> Result<(), ReleaseDomainError> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(ReleaseDomainError::NotFound { id: id.to_string() });
        }
        fs::remove_file(&path)
            .map_err(|e| ReleaseDomainError::storage(format!("delete {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::git::value_objects::BranchName;
    use crate::domains::releases::value_objects::{ReleaseNotes, ReleasePlan};
    use crate::domains::semantic::entities::ChangeSet;
    use crate::domains::semantic::value_objects::{ReleaseType, SemanticVersion};
    use tempfile::tempdir;

    fn release(id: &str) -> Release {
        let mut release = Release::new(
            RunId::new(id).unwrap(),
            BranchName::from_trusted("main"),
            PathBuf::from("/work/acme"),
            "acme",
            "tester",
        );
        release
            .set_plan(
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
        release
    }

    #[tokio::test]
    async fn save_and_reload_round_trips_the_aggregate() {
        let dir = tempdir().unwrap();
        let repo = FileReleaseRepository::new(dir.path()).unwrap();

        let mut original = release("rel-file-1");
        original
            .set_notes(
                ReleaseNotes::deterministic("## notes".to_string(), "summary".to_string()),
                "tester",
            )
            .unwrap();
        repo.save(&original).await.unwrap();

        let restored = repo
            .find_by_id(&RunId::new("rel-file-1").unwrap())
            .await
            .unwrap();
        assert_eq!(restored.state(), original.state());
        assert_eq!(restored.notes().unwrap().text, "## notes");
        assert_eq!(
            restored.plan().unwrap().next_version.to_string(),
            "0.2.0"
        );
    }

    #[tokio::test]
    async fn missing_release_is_not_found() {
        let dir = tempdir().unwrap();
        let repo = FileReleaseRepository::new(dir.path()).unwrap();
        assert!(matches!(
            repo.find_by_id(&RunId::new("rel-none").unwrap()).await,
            Err(ReleaseDomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn stale_revision_conflicts_on_disk_too() {
        let dir = tempdir().unwrap();
        let repo = FileReleaseRepository::new(dir.path()).unwrap();

        let stale = release("rel-file-2");
        repo.save(&stale).await.unwrap();
        let fresh = repo
            .find_by_id(&RunId::new("rel-file-2").unwrap())
            .await
            .unwrap();
        repo.save(&fresh).await.unwrap();

        assert!(matches!(
            repo.save(&stale).await,
            Err(ReleaseDomainError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn find_latest_picks_most_recently_updated() {
        let dir = tempdir().unwrap();
        let repo = FileReleaseRepository::new(dir.path()).unwrap();

        repo.save(&release("rel-old")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.save(&release("rel-new")).await.unwrap();

        let latest = repo.find_latest(&PathBuf::from("/work/acme")).await.unwrap();
        assert_eq!(latest.id().as_str(), "rel-new");
    }

    #[tokio::test]
    async fn delete_removes_the_document() {
        let dir = tempdir().unwrap();
        let repo = FileReleaseRepository::new(dir.path()).unwrap();

        repo.save(&release("rel-gone")).await.unwrap();
        repo.delete(&RunId::new("rel-gone").unwrap()).await.unwrap();
        assert!(repo.find_by_id(&RunId::new("rel-gone").unwrap()).await.is_err());
        assert!(repo.delete(&RunId::new("rel-gone").unwrap()).await.is_err());
    }
}
