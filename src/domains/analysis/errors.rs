//! Commit analysis error types

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum AnalysisDomainError {
    #[error("no symbol parser registered for language: {language}")]
    #[diagnostic(code(analysis::language_unsupported))]
    LanguageUnsupported { language: String },

    #[error("symbol diff failed for {path}: {message}")]
    #[diagnostic(code(analysis::symbol_diff_failed))]
    SymbolDiffFailed { path: String, message: String },

    #[error("classification failed for commit {hash}: {message}")]
    #[diagnostic(code(analysis::classification_failed))]
    ClassificationFailed { hash: String, message: String },
}
