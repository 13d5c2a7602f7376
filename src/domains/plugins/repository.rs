//! Plugin executor port

use crate::domains::plugins::{
    errors::PluginDomainError,
    value_objects::{PluginHook, PluginRequest, PluginResponse, ReleaseContext},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Port implemented by the plugin host
#[async_trait]
pub trait PluginExecutorPort: Send + Sync {
    /// Runs every plugin subscribed to the hook and collects their responses
    async fn execute_hook(
        &self,
        hook: PluginHook,
        context: &ReleaseContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<PluginResponse>, PluginDomainError>;

    /// Invokes one plugin directly
    async fn execute_plugin(
        &self,
        plugin_id: &str,
        request: PluginRequest,
        cancel: &CancellationToken,
    ) -> Result<PluginResponse, PluginDomainError>;
}
