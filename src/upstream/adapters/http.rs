//! Streamable-HTTP MCP transport built on the `rmcp` client.

use crate::upstream::{
    ToolCallResult, UpstreamConnector, UpstreamEndpoint, UpstreamError, UpstreamHeaders,
    UpstreamResult, UpstreamSession, UpstreamTool,
};
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use rmcp::{
    RoleClient, ServiceExt,
    model::{
        CallToolRequestParam, ClientCapabilities, ClientInfo, Implementation,
        PaginatedRequestParam, ProtocolVersion, Tool,
    },
    service::{Peer, RunningService, ServiceError},
    transport::{
        StreamableHttpClientTransport, streamable_http_client::StreamableHttpClientTransportConfig,
    },
};
use serde_json::{Value, json};
use std::{future::Future, time::Duration};
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

const MAX_TOOL_PAGES: usize = 64;

/// Transport settings for [`HttpUpstreamConnector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUpstreamSettings {
    /// Budget for the handshake and for each request on an open session.
    pub request_timeout: Duration,
    /// Client name announced during `initialize`.
    pub client_name: String,
    /// Client version announced during `initialize`.
    pub client_version: String,
}

impl Default for HttpUpstreamSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            client_name: env!("CARGO_PKG_NAME").to_owned(),
            client_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// Connector speaking MCP over streamable HTTP.
///
/// Each session gets its own `reqwest` client so the tenant's credential
/// headers ride on every request of that session and no other.
#[derive(Debug, Clone)]
pub struct HttpUpstreamConnector {
    settings: HttpUpstreamSettings,
}

impl HttpUpstreamConnector {
    /// Builds a connector, checking that an HTTP client can be constructed.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Transport`] when the HTTP client cannot be
    /// constructed, for example when no TLS backend is available.
    pub fn new(settings: HttpUpstreamSettings) -> UpstreamResult<Self> {
        http_client(&settings, &UpstreamHeaders::new())?;
        Ok(Self { settings })
    }

    fn client_info(&self) -> ClientInfo {
        ClientInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: self.settings.client_name.clone(),
                version: self.settings.client_version.clone(),
                ..Implementation::default()
            },
        }
    }
}

fn http_client(settings: &HttpUpstreamSettings, headers: &UpstreamHeaders) -> UpstreamResult<Client> {
    Client::builder()
        .connect_timeout(settings.request_timeout)
        .default_headers(header_map(headers))
        .build()
        .map_err(|err| UpstreamError::Transport(err.to_string()))
}

#[async_trait]
impl UpstreamConnector for HttpUpstreamConnector {
    async fn connect(
        &self,
        endpoint: &UpstreamEndpoint,
    ) -> UpstreamResult<Box<dyn UpstreamSession>> {
        let url = Url::parse(&endpoint.url).map_err(|err| UpstreamError::Connect {
            url: endpoint.url.clone(),
            message: err.to_string(),
        })?;
        let http = http_client(&self.settings, &endpoint.headers)?;
        let transport = StreamableHttpClientTransport::with_client(
            http,
            StreamableHttpClientTransportConfig::with_uri(url.as_str()),
        );
        let request_timeout = self.settings.request_timeout;
        let service = timeout(request_timeout, self.client_info().serve(transport))
            .await
            .map_err(|_| UpstreamError::Timeout {
                operation: "initialize",
                after: request_timeout,
            })?
            .map_err(|err| UpstreamError::Connect {
                url: endpoint.url.clone(),
                message: err.to_string(),
            })?;
        let capabilities = service
            .peer()
            .peer_info()
            .and_then(|info| serde_json::to_value(&info.capabilities).ok())
            .unwrap_or_else(|| json!({}));
        debug!(url = %endpoint.url, "upstream handshake complete");
        Ok(Box::new(HttpSession {
            service: Some(service),
            capabilities,
            request_timeout,
        }))
    }
}

/// Converts header pairs, skipping names or values HTTP cannot carry.
fn header_map(headers: &UpstreamHeaders) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let parsed = HeaderName::from_bytes(name.as_bytes())
            .ok()
            .zip(HeaderValue::from_str(value).ok());
        match parsed {
            Some((header_name, mut header_value)) => {
                header_value.set_sensitive(true);
                map.insert(header_name, header_value);
            }
            None => warn!(header = %name, "skipping header that is not valid HTTP"),
        }
    }
    map
}

struct HttpSession {
    service: Option<RunningService<RoleClient, ClientInfo>>,
    capabilities: Value,
    request_timeout: Duration,
}

impl HttpSession {
    fn peer(&self) -> UpstreamResult<&Peer<RoleClient>> {
        self.service
            .as_ref()
            .map(RunningService::peer)
            .ok_or(UpstreamError::Closed)
    }
}

async fn within<T>(
    budget: Duration,
    operation: &'static str,
    request: impl Future<Output = Result<T, ServiceError>>,
) -> UpstreamResult<T> {
    timeout(budget, request)
        .await
        .map_err(|_| UpstreamError::Timeout {
            operation,
            after: budget,
        })?
        .map_err(service_error)
}

fn service_error(err: ServiceError) -> UpstreamError {
    match err {
        ServiceError::McpError(data) => UpstreamError::Rpc {
            code: i64::from(data.code.0),
            message: data.message.into_owned(),
        },
        other => UpstreamError::Transport(other.to_string()),
    }
}

fn decode_tool(tool: &Tool) -> UpstreamResult<UpstreamTool> {
    let entry = serde_json::to_value(tool)
        .map_err(|err| UpstreamError::Protocol(format!("tool descriptor: {err}")))?;
    UpstreamTool::from_wire(&entry)
}

#[async_trait]
impl UpstreamSession for HttpSession {
    fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    async fn list_tools(&mut self) -> UpstreamResult<Vec<UpstreamTool>> {
        let peer = self.peer()?;
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_TOOL_PAGES {
            let request = Some(PaginatedRequestParam {
                cursor: cursor.take(),
            });
            let page = within(self.request_timeout, "tools/list", peer.list_tools(request)).await?;
            for tool in &page.tools {
                tools.push(decode_tool(tool)?);
            }
            match page.next_cursor.filter(|next| !next.is_empty()) {
                Some(next) => cursor = Some(next),
                None => return Ok(tools),
            }
        }
        Err(UpstreamError::Protocol(format!(
            "tools/list did not finish within {MAX_TOOL_PAGES} pages"
        )))
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> UpstreamResult<ToolCallResult> {
        let peer = self.peer()?;
        let fields = match arguments {
            Value::Object(fields) => Some(fields),
            _ => None,
        };
        let request = CallToolRequestParam {
            name: name.to_owned().into(),
            arguments: fields,
        };
        let result = within(self.request_timeout, "tools/call", peer.call_tool(request)).await?;
        serde_json::to_value(result)
            .map(ToolCallResult)
            .map_err(|err| UpstreamError::Protocol(format!("tool result: {err}")))
    }

    async fn close(&mut self) {
        let Some(service) = self.service.take() else {
            return;
        };
        match service.cancel().await {
            Ok(reason) => debug!(?reason, "upstream session closed"),
            Err(err) => warn!(error = %err, "failed to close upstream session"),
        }
    }
}
