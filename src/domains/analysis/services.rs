//! Commit analyzer
//!
//! Classifies commits the conventional parser could not handle. The chain
//! runs in declared order; the first method whose confidence clears the
//! configured gate wins. Below the gate the commit keeps its record, but
//! with the type cleared, so reviewers can see what was attempted.

use crate::domains::ai::repository::AiServicePort;
use crate::domains::analysis::{
    repository::AstDiffPort,
    value_objects::{is_test_file, AnalyzerConfig, SymbolDelta},
};
use crate::domains::git::{
    entities::Commit,
    repository::SourceControlPort,
    value_objects::RefName,
};
use crate::domains::semantic::value_objects::{
    ClassificationMethod, CommitClassification, CommitType,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Subject keywords per commit type, strongest table first
const KEYWORD_TABLES: &[(CommitType, &[&str])] = &[
    (CommitType::Revert, &["revert"]),
    (CommitType::Fix, &["fix", "bug", "repair", "correct", "resolve", "hotfix"]),
    (CommitType::Feat, &["add", "new", "introduce", "implement", "support"]),
    (CommitType::Refactor, &["refactor", "restructure", "simplify", "clean up", "cleanup"]),
    (CommitType::Perf, &["optimize", "speed up", "performance"]),
    (CommitType::Docs, &["document", "docs", "readme", "changelog"]),
    (CommitType::Test, &["test", "coverage"]),
    (CommitType::Build, &["build", "dependency", "upgrade", "bump"]),
    (CommitType::Ci, &["ci", "pipeline", "workflow"]),
];

const PREFIX_CONFIDENCE: f64 = 0.8;
const CONTAINS_CONFIDENCE: f64 = 0.6;
const AST_BREAKING_CONFIDENCE: f64 = 0.85;
const AST_ADDITIVE_CONFIDENCE: f64 = 0.8;
const AST_REFACTOR_CONFIDENCE: f64 = 0.65;

/// Classifies commits through the heuristic → AST → AI fallback chain
pub struct CommitAnalyzer {
    config: AnalyzerConfig,
    git: Arc<dyn SourceControlPort>,
    ast_ports: Vec<Arc<dyn AstDiffPort>>,
    ai: Option<Arc<dyn AiServicePort>>,
}

impl CommitAnalyzer {
    pub fn new(
        config: AnalyzerConfig,
        git: Arc<dyn SourceControlPort>,
        ast_ports: Vec<Arc<dyn AstDiffPort>>,
        ai: Option<Arc<dyn AiServicePort>>,
    ) -> Self {
        Self {
            config,
            git,
            ast_ports,
            ai,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Classifies one commit.
    ///
    /// A manual override for the hash bypasses the chain entirely. A commit
    /// touching only skip-listed paths is marked skippable.
    pub async fn classify(
        &self,
        commit: &Commit,
        overrides: &HashMap<String, CommitClassification>,
        cancel: &CancellationToken,
    ) -> CommitClassification {
        if let Some(manual) = overrides.get(commit.hash.as_str()) {
            let mut manual = manual.clone();
            manual.method = ClassificationMethod::Manual;
            return manual;
        }

        if self.touches_only_skipped_paths(commit).await {
            let mut skipped = CommitClassification::unresolved(
                commit.hash.as_str(),
                ClassificationMethod::Heuristic,
                0.0,
            );
            skipped.should_skip = true;
            return skipped;
        }

        let mut best: Option<CommitClassification> = None;

        for candidate in self.run_chain(commit, cancel).await {
            if candidate.confidence >= self.config.min_confidence {
                return candidate;
            }
            let replace = best
                .as_ref()
                .map(|b| candidate.confidence > b.confidence)
                .unwrap_or(true);
            if replace {
                best = Some(candidate);
            }
        }

        // Nothing cleared the gate: keep the record, clear the type.
        let (method, confidence) = best
            .map(|b| (b.method, b.confidence))
            .unwrap_or((ClassificationMethod::Heuristic, 0.0));
        CommitClassification::unresolved(commit.hash.as_str(), method, confidence)
    }

    /// Classifies many commits concurrently, preserving input order
    pub async fn classify_all(
        &self,
        commits: &[Commit],
        overrides: &HashMap<String, CommitClassification>,
        cancel: &CancellationToken,
    ) -> Vec<CommitClassification> {
        let tasks = commits
            .iter()
            .map(|commit| self.classify(commit, overrides, cancel));
        futures::future::join_all(tasks).await
    }

    async fn run_chain(
        &self,
        commit: &Commit,
        cancel: &CancellationToken,
    ) -> Vec<CommitClassification> {
        let mut candidates = Vec::new();

        if let Some(heuristic) = self.heuristic(commit) {
            if heuristic.confidence >= self.config.min_confidence {
                return vec![heuristic];
            }
            candidates.push(heuristic);
        }

        if self.config.enable_ast {
            match self.ast_classify(commit).await {
                Ok(Some(ast)) => {
                    if ast.confidence >= self.config.min_confidence {
                        candidates.push(ast);
                        return candidates;
                    }
                    candidates.push(ast);
                }
                Ok(None) => {}
                Err(message) => debug!(hash = commit.hash.as_str(), "AST stage skipped: {}", message),
            }
        }

        if self.config.enable_ai {
            if let Some(ai) = self.ai.as_ref().filter(|ai| ai.is_available()) {
                match self.ai_classify(ai.as_ref(), commit, cancel).await {
                    Ok(classification) => candidates.push(classification),
                    Err(message) => {
                        warn!(hash = commit.hash.as_str(), "AI classification failed: {}", message)
                    }
                }
            }
        }

        candidates
    }

    /// Keyword tables over the commit subject, confidence scaled by whether
    /// the keyword leads the subject or merely appears in it
    fn heuristic(&self, commit: &Commit) -> Option<CommitClassification> {
        let subject = commit.subject().to_lowercase();
        if subject.is_empty() {
            return None;
        }

        let mut matched: Option<(CommitType, f64)> = None;
        for (commit_type, keywords) in KEYWORD_TABLES {
            for keyword in *keywords {
                let confidence = if subject.starts_with(keyword) {
                    Some(PREFIX_CONFIDENCE)
                } else if subject.contains(keyword) {
                    Some(CONTAINS_CONFIDENCE)
                } else {
                    None
                };
                if let Some(confidence) = confidence {
                    let better = matched.map(|(_, c)| confidence > c).unwrap_or(true);
                    if better {
                        matched = Some((*commit_type, confidence));
                    }
                }
            }
        }

        let (commit_type, confidence) = matched?;
        let is_breaking = subject.contains("breaking");
        Some(CommitClassification {
            commit_hash: commit.hash.as_str().to_string(),
            commit_type: Some(commit_type),
            scope: None,
            is_breaking,
            breaking_reason: is_breaking.then(|| commit.subject().to_string()),
            confidence,
            method: ClassificationMethod::Heuristic,
            should_skip: false,
        })
    }

    /// Symbol-level diffing of the files the commit touched
    async fn ast_classify(&self, commit: &Commit) -> Result<Option<CommitClassification>, String> {
        let stats = self
            .git
            .get_commit_diff_stats(&commit.hash)
            .await
            .map_err(|e| e.to_string())?;

        let parent = match commit.parents.first() {
            Some(parent) => parent.clone(),
            None => return Ok(None),
        };
        let parent_ref = RefName::new(parent.as_str().to_string()).map_err(|e| e.to_string())?;
        let commit_ref = RefName::new(commit.hash.as_str().to_string()).map_err(|e| e.to_string())?;

        let mut delta = SymbolDelta::default();
        let mut non_test_source_seen = false;

        for file in &stats.files {
            let extension = match file.path.extension().and_then(|e| e.to_str()) {
                Some(extension) => extension,
                None => continue,
            };
            if !self.config.language_enabled(extension)
                || self.config.path_skipped(&file.path)
                || is_test_file(&file.path)
            {
                continue;
            }
            let port = match self
                .ast_ports
                .iter()
                .find(|p| p.extensions().iter().any(|e| e.eq_ignore_ascii_case(extension)))
            {
                Some(port) => port,
                None => continue,
            };
            non_test_source_seen = true;

            let path_text = file.path.to_string_lossy().into_owned();
            let before = self
                .git
                .get_file_at_ref(&parent_ref, &file.path)
                .await
                .map_err(|e| e.to_string())?;
            let after = self
                .git
                .get_file_at_ref(&commit_ref, &file.path)
                .await
                .map_err(|e| e.to_string())?
                .unwrap_or_default();

            let file_delta = port
                .diff_symbols(&path_text, before.as_deref(), &after)
                .await
                .map_err(|e| e.to_string())?;
            delta.merge(file_delta);
        }

        if !non_test_source_seen {
            return Ok(None);
        }

        let classification = if delta.breaks_exported_surface() {
            CommitClassification {
                commit_hash: commit.hash.as_str().to_string(),
                commit_type: Some(CommitType::Feat),
                scope: None,
                is_breaking: true,
                breaking_reason: Some("exported symbol signatures changed".to_string()),
                confidence: AST_BREAKING_CONFIDENCE,
                method: ClassificationMethod::Ast,
                should_skip: false,
            }
        } else if delta.is_pure_exported_addition() {
            CommitClassification {
                commit_hash: commit.hash.as_str().to_string(),
                commit_type: Some(CommitType::Feat),
                scope: None,
                is_breaking: false,
                breaking_reason: None,
                confidence: AST_ADDITIVE_CONFIDENCE,
                method: ClassificationMethod::Ast,
                should_skip: false,
            }
        } else if !delta.is_empty() {
            CommitClassification {
                commit_hash: commit.hash.as_str().to_string(),
                commit_type: Some(CommitType::Refactor),
                scope: None,
                is_breaking: false,
                breaking_reason: None,
                confidence: AST_REFACTOR_CONFIDENCE,
                method: ClassificationMethod::Ast,
                should_skip: false,
            }
        } else {
            return Ok(None);
        };

        Ok(Some(classification))
    }

    async fn ai_classify(
        &self,
        ai: &dyn AiServicePort,
        commit: &Commit,
        cancel: &CancellationToken,
    ) -> Result<CommitClassification, String> {
        let patch = self
            .git
            .get_commit_patch(&commit.hash)
            .await
            .map_err(|e| e.to_string())?;

        let response = ai
            .classify_commit(&commit.message, &patch, cancel)
            .await
            .map_err(|e| e.to_string())?;

        let commit_type = CommitType::from_token(&response.commit_type);
        Ok(CommitClassification {
            commit_hash: commit.hash.as_str().to_string(),
            commit_type: Some(commit_type),
            scope: response.scope,
            is_breaking: response.is_breaking,
            breaking_reason: response.reason,
            confidence: response.confidence.clamp(0.0, 1.0),
            method: ClassificationMethod::Ai,
            should_skip: false,
        })
    }

    async fn touches_only_skipped_paths(&self, commit: &Commit) -> bool {
        if self.config.skip_paths.is_empty() {
            return false;
        }
        match self.git.get_commit_diff_stats(&commit.hash).await {
            Ok(stats) => {
                !stats.files.is_empty()
                    && stats.files.iter().all(|f| self.config.path_skipped(&f.path))
            }
            Err(_) => false,
        }
    }
}
