//! Plugin domain error types

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PluginDomainError {
    #[error("plugin {plugin} failed during {hook}: {message}")]
    #[diagnostic(code(plugins::hook_failed))]
    HookFailed {
        hook: String,
        plugin: String,
        message: String,
    },

    #[error("plugin not found: {plugin}")]
    #[diagnostic(code(plugins::not_found))]
    PluginNotFound { plugin: String },

    #[error("plugin execution failed: {message}")]
    #[diagnostic(code(plugins::execution_failed))]
    ExecutionFailed { message: String },
}
