//! Deterministic release-notes composition
//!
//! The fallback (and default) generator: groups the changeset by commit
//! type in Keep-a-Changelog style, with breaking changes elevated to the
//! top. Always available, never calls out.

use crate::domains::releases::value_objects::ReleaseNotes;
use crate::domains::semantic::entities::{ChangeSet, ConventionalCommit};
use crate::domains::semantic::value_objects::{CommitType, SemanticVersion};
use chrono::Utc;

/// Section order below the breaking-changes block
const SECTION_ORDER: &[CommitType] = &[
    CommitType::Feat,
    CommitType::Fix,
    CommitType::Perf,
    CommitType::Refactor,
    CommitType::Docs,
    CommitType::Test,
    CommitType::Build,
    CommitType::Ci,
    CommitType::Revert,
    CommitType::Chore,
    CommitType::Unknown,
];

/// Composes notes and changelog sections from a changeset
#[derive(Debug, Default, Clone, Copy)]
pub struct NotesComposer;

impl NotesComposer {
    pub fn new() -> Self {
        Self
    }

    /// Full release notes document for a version
    pub fn compose(&self, version: &SemanticVersion, change_set: &ChangeSet) -> ReleaseNotes {
        let text = self.changelog_section(version, change_set);
        ReleaseNotes::deterministic(text, change_set.summary())
    }

    /// One Keep-a-Changelog section: heading, breaking changes first, then
    /// the typed groups in a fixed order
    pub fn changelog_section(&self, version: &SemanticVersion, change_set: &ChangeSet) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "## [{}] - {}\n",
            version,
            Utc::now().format("%Y-%m-%d")
        ));

        let breaking: Vec<&ConventionalCommit> = change_set
            .commits()
            .iter()
            .filter(|c| c.breaking)
            .collect();
        if !breaking.is_empty() {
            out.push_str("\n### Breaking Changes\n\n");
            for commit in &breaking {
                out.push_str(&self.entry(commit, true));
            }
        }

        for section in SECTION_ORDER {
            let members: Vec<&ConventionalCommit> = change_set
                .commits()
                .iter()
                .filter(|c| !c.breaking && c.commit_type == *section)
                .collect();
            if members.is_empty() {
                continue;
            }
            out.push_str(&format!("\n### {}\n\n", section.section_title()));
            for commit in &members {
                out.push_str(&self.entry(commit, false));
            }
        }

        out
    }

    fn entry(&self, commit: &ConventionalCommit, with_reason: bool) -> String {
        let mut line = String::from("- ");
        if let Some(scope) = &commit.scope {
            line.push_str(&format!("**{}:** ", scope));
        }
        line.push_str(&commit.subject);
        line.push_str(&format!(" ({})", commit.short_hash()));
        if with_reason {
            if let Some(reason) = commit
                .breaking_reason
                .as_ref()
                .filter(|r| r.as_str() != commit.subject)
            {
                line.push_str(&format!(" ({})", reason));
            }
        }
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::semantic::entities::CommitAuthor;

    fn changeset(messages: &[&str]) -> ChangeSet {
        let mut set = ChangeSet::new("cs", None, "HEAD");
        for (i, message) in messages.iter().enumerate() {
            let commit = ConventionalCommit::parse(
                format!("abcdef{:06}", i),
                message,
                CommitAuthor {
                    name: "Dev".to_string(),
                    email: "dev@example.com".to_string(),
                },
                Utc::now(),
            )
            .unwrap();
            let classification = commit.classification();
            set.add(commit, classification);
        }
        set
    }

    #[test]
    fn groups_by_type_with_breaking_first() {
        let set = changeset(&[
            "fix(net): retry on reset",
            "feat(api): pagination",
            "feat!: drop v1 endpoints\n\nBREAKING CHANGE: v1 API removed",
        ]);
        let version = SemanticVersion::parse("2.0.0").unwrap();
        let text = NotesComposer::new().changelog_section(&version, &set);

        let breaking_at = text.find("### Breaking Changes").unwrap();
        let features_at = text.find("### Features").unwrap();
        let fixes_at = text.find("### Bug Fixes").unwrap();
        assert!(breaking_at < features_at);
        assert!(features_at < fixes_at);
        assert!(text.contains("drop v1 endpoints"));
        assert!(text.contains("(v1 API removed)"));
        assert!(text.contains("**api:** pagination"));
        assert!(text.starts_with("## [2.0.0] -"));
    }

    #[test]
    fn breaking_commits_do_not_repeat_in_their_type_section() {
        let set = changeset(&["feat!: rewrite config"]);
        let version = SemanticVersion::parse("1.0.0").unwrap();
        let text = NotesComposer::new().changelog_section(&version, &set);
        assert_eq!(text.matches("rewrite config").count(), 1);
    }

    #[test]
    fn compose_carries_the_summary() {
        let set = changeset(&["feat: a", "fix: b"]);
        let version = SemanticVersion::parse("0.2.0").unwrap();
        let notes = NotesComposer::new().compose(&version, &set);
        assert!(!notes.ai_generated);
        assert_eq!(notes.provider, "deterministic");
        assert_eq!(notes.summary, "1 feature(s), 1 fix(es)");
    }
}
