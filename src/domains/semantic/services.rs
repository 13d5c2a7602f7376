//! Semantic domain services

use crate::domains::semantic::{
    errors::SemanticDomainError,
    repository::VersionCalculatorPort,
    value_objects::{BumpType, ReleaseType, SemanticVersion},
};
use std::cmp::Ordering;

/// Default version calculator backed by the value-object arithmetic
#[derive(Debug, Default, Clone, Copy)]
pub struct SemverCalculator;

impl SemverCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl VersionCalculatorPort for SemverCalculator {
    fn parse(&self, input: &str) -> Result<SemanticVersion, SemanticDomainError> {
        SemanticVersion::parse(input)
    }

    fn compare(&self, a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
        a.cmp(b)
    }

    fn bump(
        &self,
        version: &SemanticVersion,
        bump: BumpType,
        prerelease_id: Option<&str>,
    ) -> SemanticVersion {
        version.bump(bump, prerelease_id)
    }

    fn next_version(&self, current: &SemanticVersion, release_type: ReleaseType) -> SemanticVersion {
        current.bump(release_type.bump_type(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_version_follows_release_type() {
        let calculator = SemverCalculator::new();
        let current = SemanticVersion::parse("0.1.0").unwrap();

        assert_eq!(
            calculator
                .next_version(&current, ReleaseType::Minor)
                .to_string(),
            "0.2.0"
        );
        assert_eq!(
            calculator
                .next_version(&current, ReleaseType::Major)
                .to_string(),
            "1.0.0"
        );
        assert_eq!(
            calculator
                .next_version(&current, ReleaseType::Patch)
                .to_string(),
            "0.1.1"
        );
    }

    #[test]
    fn compare_delegates_to_semver_order() {
        let calculator = SemverCalculator::new();
        let a = SemanticVersion::parse("1.0.0-rc.1").unwrap();
        let b = SemanticVersion::parse("1.0.0").unwrap();
        assert_eq!(calculator.compare(&a, &b), Ordering::Less);
    }
}
