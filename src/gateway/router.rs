//! Per-request routing of protocol calls to upstream servers.

use super::ProxyError;
use crate::{
    registry::{
        domain::{Tool, VirtualServerId},
        ports::RegistryStore,
    },
    upstream::{ToolCallResult, UpstreamClient, UpstreamConnector, UpstreamEndpoint, empty_object_schema},
    vault::{CredentialVault, build_headers},
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A tool as callers of a virtual server see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposedTool {
    /// Upstream-native tool name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Input schema, an empty object schema when none was stored.
    pub input_schema: Value,
    /// Annotations, omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

impl From<&Tool> for ExposedTool {
    fn from(tool: &Tool) -> Self {
        let input_schema = match tool.input_schema() {
            Value::Null => empty_object_schema(),
            Value::Object(fields) if fields.is_empty() => empty_object_schema(),
            schema => schema.clone(),
        };
        let annotations = match tool.annotations() {
            Value::Object(fields) if !fields.is_empty() => Some(tool.annotations().clone()),
            _ => None,
        };
        Self {
            name: tool.original_name().to_owned(),
            description: tool.description().to_owned(),
            input_schema,
            annotations,
        }
    }
}

/// Serves `tools/list` and `tools/call` for virtual servers.
///
/// Every request re-reads the registry; nothing is cached per virtual server.
pub struct ProxyRouter<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector,
{
    repository: Arc<S>,
    upstream: UpstreamClient<U>,
    vault: Option<Arc<CredentialVault>>,
}

impl<S, U> Clone for ProxyRouter<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            upstream: self.upstream.clone(),
            vault: self.vault.clone(),
        }
    }
}

impl<S, U> ProxyRouter<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector,
{
    /// Creates a proxy router.
    #[must_use]
    pub const fn new(
        repository: Arc<S>,
        upstream: UpstreamClient<U>,
        vault: Option<Arc<CredentialVault>>,
    ) -> Self {
        Self {
            repository,
            upstream,
            vault,
        }
    }

    /// Lists the tools attached to a virtual server under their upstream
    /// names. An unknown virtual server has no tools.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Repository`] when the registry cannot be read.
    pub async fn list_tools(
        &self,
        virtual_server_id: VirtualServerId,
    ) -> Result<Vec<ExposedTool>, ProxyError> {
        let tools = self
            .repository
            .list_attached_tools(virtual_server_id)
            .await?;
        debug!(%virtual_server_id, tool_count = tools.len(), "listing virtual server tools");
        Ok(tools.iter().map(ExposedTool::from).collect())
    }

    /// Forwards one tool call to the upstream that serves it.
    ///
    /// The call is authorized only when the virtual server's owner holds a
    /// hub binding to the tool's catalog server. The upstream result,
    /// including its `isError` flag, is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::ToolNotFound`], [`ProxyError::VirtualServerNotFound`],
    /// [`ProxyError::Unauthorized`], [`ProxyError::Upstream`] or
    /// [`ProxyError::Repository`].
    #[instrument(skip(self, arguments), fields(%virtual_server_id))]
    pub async fn call_tool(
        &self,
        virtual_server_id: VirtualServerId,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, ProxyError> {
        let tool = self
            .repository
            .list_attached_tools(virtual_server_id)
            .await?
            .into_iter()
            .find(|candidate| candidate.original_name() == name)
            .ok_or_else(|| ProxyError::ToolNotFound(name.to_owned()))?;
        let virtual_server = self
            .repository
            .find_virtual_server(virtual_server_id)
            .await?
            .ok_or(ProxyError::VirtualServerNotFound(virtual_server_id))?;
        let Some(binding) = self
            .repository
            .find_hub_for_user(virtual_server.user_id(), tool.catalog_server_id())
            .await?
        else {
            warn!(catalog_server_id = %tool.catalog_server_id(), "owner has no hub binding for tool");
            return Err(ProxyError::Unauthorized {
                catalog_server_id: tool.catalog_server_id(),
            });
        };
        let headers = build_headers(
            binding.hub.auth_type(),
            binding.hub.auth_value(),
            self.vault.as_deref(),
        );
        let endpoint = UpstreamEndpoint::new(binding.server.url().as_str(), headers);
        let result = self
            .upstream
            .call_tool(&endpoint, tool.original_name(), object_arguments(arguments))
            .await?;
        info!(
            tool = tool.original_name(),
            hub_id = %binding.hub.id(),
            is_error = result.is_error(),
            "tool call proxied"
        );
        Ok(result)
    }
}

fn object_arguments(arguments: Value) -> Value {
    match arguments {
        Value::Object(_) => arguments,
        _ => Value::Object(Map::new()),
    }
}
