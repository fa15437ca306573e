//! MCP server handler for one virtual server.
//!
//! `rmcp` owns the protocol: framing, `initialize`, `ping`, notifications
//! and every method this handler leaves at its default. Only `tools/list`
//! and `tools/call` reach the proxy router.

use super::{ExposedTool, ProxyRouter};
use crate::{
    registry::{domain::VirtualServerId, ports::RegistryStore},
    upstream::UpstreamConnector,
};
use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, InitializeRequestParam,
        InitializeResult, JsonObject, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use serde_json::Value;
use std::{future::Future, sync::Arc};
use tracing::{debug, error, warn};

/// Protocol revisions echoed back when a client asks for them, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: [ProtocolVersion; 2] =
    [ProtocolVersion::V_2025_03_26, ProtocolVersion::V_2024_11_05];

/// Picks the revision answered to a client that asked for `requested`.
#[must_use]
pub fn negotiate_protocol_version(requested: &ProtocolVersion) -> ProtocolVersion {
    if SUPPORTED_PROTOCOL_VERSIONS.contains(requested) {
        requested.clone()
    } else {
        ProtocolVersion::V_2025_03_26
    }
}

/// Serves one virtual server's tools through the proxy router.
pub struct VirtualServerService<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    proxy: ProxyRouter<S, U>,
    virtual_server_id: VirtualServerId,
}

impl<S, U> Clone for VirtualServerService<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    fn clone(&self) -> Self {
        Self {
            proxy: self.proxy.clone(),
            virtual_server_id: self.virtual_server_id,
        }
    }
}

impl<S, U> VirtualServerService<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    /// Binds the proxy router to one virtual server.
    #[must_use]
    pub const fn new(proxy: ProxyRouter<S, U>, virtual_server_id: VirtualServerId) -> Self {
        Self {
            proxy,
            virtual_server_id,
        }
    }
}

fn protocol_tool(tool: ExposedTool) -> Tool {
    let annotations = tool.annotations.and_then(|raw| {
        serde_json::from_value(raw)
            .inspect_err(|err| warn!(tool = %tool.name, error = %err, "dropping unreadable annotations"))
            .ok()
    });
    let schema = match tool.input_schema {
        Value::Object(fields) => fields,
        _ => JsonObject::new(),
    };
    let mut descriptor = Tool::new(tool.name, tool.description, Arc::new(schema));
    descriptor.annotations = annotations;
    descriptor
}

impl<S, U> ServerHandler for VirtualServerService<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Implementation::default()
            },
            instructions: None,
        }
    }

    fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<InitializeResult, ErrorData>> + Send + '_ {
        let mut info = self.get_info();
        info.protocol_version = negotiate_protocol_version(&request.protocol_version);
        std::future::ready(Ok(info))
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            let tools = self
                .proxy
                .list_tools(self.virtual_server_id)
                .await
                .map_err(|err| {
                    error!(error = %err, virtual_server_id = %self.virtual_server_id, "tools/list failed");
                    ErrorData::from(&err)
                })?;
            Ok(ListToolsResult::with_all_items(
                tools.into_iter().map(protocol_tool).collect(),
            ))
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let arguments = request.arguments.map_or(Value::Null, Value::Object);
            let result = self
                .proxy
                .call_tool(self.virtual_server_id, &request.name, arguments)
                .await
                .map_err(|err| {
                    debug!(error = %err, "tools/call failed");
                    ErrorData::from(&err)
                })?;
            serde_json::from_value(result.into_inner()).map_err(|err| {
                ErrorData::internal_error(format!("upstream result is not a tool result: {err}"), None)
            })
        }
    }
}
