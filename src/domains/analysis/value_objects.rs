//! Analysis configuration and symbol-diff values

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Classifications below this confidence have their type cleared
    pub min_confidence: f64,
    pub enable_ai: bool,
    pub enable_ast: bool,
    /// File extensions the AST stage may inspect, e.g. `rs`, `go`
    pub languages: Vec<String>,
    /// Path prefixes excluded from AST analysis; a commit touching only
    /// these paths is skipped entirely
    pub skip_paths: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            enable_ai: false,
            enable_ast: false,
            languages: Vec::new(),
            skip_paths: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn language_enabled(&self, extension: &str) -> bool {
        self.languages.iter().any(|l| l.eq_ignore_ascii_case(extension))
    }

    pub fn path_skipped(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.skip_paths.iter().any(|skip| text.starts_with(skip.as_str()))
    }

    /// Stable fingerprint of the knobs that affect classification outcomes,
    /// folded into the release run identifier so identical replans produce
    /// an identical identity.
    pub fn fingerprint(&self, tag_prefix: &str) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        tag_prefix.hash(&mut hasher);
        self.min_confidence.to_bits().hash(&mut hasher);
        self.enable_ai.hash(&mut hasher);
        self.enable_ast.hash(&mut hasher);
        self.languages.hash(&mut hasher);
        self.skip_paths.hash(&mut hasher);
        hasher.finish()
    }
}

/// Whether a path looks like a test file (`foo_test.rs`, `bar_test.go`)
pub fn is_test_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.ends_with("_test"))
        .unwrap_or(false)
}

/// Kind of symbol reported by a language diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Type,
    Constant,
    Other,
}

/// One declared symbol in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub exported: bool,
}

/// Symbol-level difference between two revisions of a file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolDelta {
    pub added: Vec<Symbol>,
    /// Symbols present before and gone after
    pub removed: Vec<Symbol>,
    /// Symbols whose signature changed
    pub modified: Vec<Symbol>,
}

impl SymbolDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn merge(&mut self, other: SymbolDelta) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.modified.extend(other.modified);
    }

    /// Exported surface changed in a way existing callers can observe
    pub fn breaks_exported_surface(&self) -> bool {
        self.removed.iter().any(|s| s.exported) || self.modified.iter().any(|s| s.exported)
    }

    /// Only additions, all of them to the exported surface
    pub fn is_pure_exported_addition(&self) -> bool {
        !self.added.is_empty()
            && self.added.iter().any(|s| s.exported)
            && self.removed.is_empty()
            && self.modified.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn symbol(name: &str, exported: bool) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::Function,
            exported,
        }
    }

    #[test]
    fn test_files_are_detected() {
        assert!(is_test_file(&PathBuf::from("src/parser_test.rs")));
        assert!(is_test_file(&PathBuf::from("pkg/math_test.go")));
        assert!(!is_test_file(&PathBuf::from("src/parser.rs")));
    }

    #[test]
    fn pure_additions_are_distinguished_from_breaking_changes() {
        let additive = SymbolDelta {
            added: vec![symbol("NewThing", true)],
            ..Default::default()
        };
        assert!(additive.is_pure_exported_addition());
        assert!(!additive.breaks_exported_surface());

        let breaking = SymbolDelta {
            modified: vec![symbol("Existing", true)],
            ..Default::default()
        };
        assert!(breaking.breaks_exported_surface());
    }

    #[test]
    fn fingerprint_is_stable_and_config_sensitive() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.fingerprint("v"), config.fingerprint("v"));
        assert_ne!(config.fingerprint("v"), config.fingerprint("app-"));

        let mut other = AnalyzerConfig::default();
        other.enable_ai = true;
        assert_ne!(config.fingerprint("v"), other.fingerprint("v"));
    }
}
