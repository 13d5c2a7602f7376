//! Semantic domain ports

use crate::domains::semantic::{
    errors::SemanticDomainError,
    value_objects::{BumpType, ReleaseType, SemanticVersion},
};
use std::cmp::Ordering;

/// Port for version arithmetic.
///
/// The engine only ever talks to this trait so tests can substitute
/// deterministic fakes.
pub trait VersionCalculatorPort: Send + Sync {
    /// Parses a version string, accepting an optional leading `v`
    fn parse(&self, input: &str) -> Result<SemanticVersion, SemanticDomainError>;

    /// Total order over versions, ignoring build metadata
    fn compare(&self, a: &SemanticVersion, b: &SemanticVersion) -> Ordering;

    /// Applies a bump to a version
    fn bump(
        &self,
        version: &SemanticVersion,
        bump: BumpType,
        prerelease_id: Option<&str>,
    ) -> SemanticVersion;

    /// The next version implied by a changeset's release type
    fn next_version(&self, current: &SemanticVersion, release_type: ReleaseType) -> SemanticVersion;
}
