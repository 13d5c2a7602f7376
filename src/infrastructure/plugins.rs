//! Plugin executor used when no plugin host is wired
//!
//! Hooks succeed with no responses; direct invocations report the plugin
//! as missing.

use crate::domains::plugins::{
    errors::PluginDomainError,
    repository::PluginExecutorPort,
    value_objects::{PluginHook, PluginRequest, PluginResponse, ReleaseContext},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPluginExecutor;

#[async_trait]
impl PluginExecutorPort for NoopPluginExecutor {
    async fn execute_hook(
        &self,
        _hook: PluginHook,
        _context: &ReleaseContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<PluginResponse>, PluginDomainError> {
        Ok(Vec::new())
    }

    async fn execute_plugin(
        &self,
        plugin_id: &str,
        _request: PluginRequest,
        _cancel: &CancellationToken,
    ) -> Result<PluginResponse, PluginDomainError> {
        Err(PluginDomainError::PluginNotFound {
            plugin: plugin_id.to_string(),
        })
    }
}
