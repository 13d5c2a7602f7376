//! Analysis domain ports

use crate::domains::analysis::{errors::AnalysisDomainError, value_objects::SymbolDelta};
use async_trait::async_trait;

/// Port for language-specific symbol diffing.
///
/// An implementation parses both revisions of a file and reports the added,
/// removed, and signature-changed symbols. One implementation per language;
/// the analyzer picks by file extension.
#[async_trait]
pub trait AstDiffPort: Send + Sync {
    /// File extensions this implementation understands, without the dot
    fn extensions(&self) -> &[&str];

    /// Symbol-level difference between two revisions of one file.
    /// `before` is `None` for newly added files.
    async fn diff_symbols(
        &self,
        path: &str,
        before: Option<&[u8]>,
        after: &[u8],
    ) -> Result<SymbolDelta, AnalysisDomainError>;
}
