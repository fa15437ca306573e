//! A scripted MCP server on a loopback port that records its traffic.

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{Method, header::AUTHORIZATION},
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::RequestContext,
    transport::streamable_http_server::{
        StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
    },
};
use serde_json::Value;
use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{net::TcpListener, task::JoinHandle};

/// Session header issued by stateful MCP servers.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// One HTTP request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// HTTP method.
    pub http_method: Method,
    /// JSON-RPC method of the body, when there was one.
    pub rpc_method: Option<String>,
    /// `Authorization` header value.
    pub authorization: Option<String>,
    /// Session header value.
    pub session_id: Option<String>,
}

#[derive(Clone, Default)]
struct TrafficLog(Arc<Mutex<Vec<Exchange>>>);

impl TrafficLog {
    fn push(&self, exchange: Exchange) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(exchange);
    }

    fn snapshot(&self) -> Vec<Exchange> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Tool listing behaviour of the scripted server.
#[derive(Clone)]
pub enum Paging {
    /// Serve these pages in order, linked by cursors.
    Pages(Vec<Vec<&'static str>>),
    /// Always promise another page.
    Endless,
}

#[derive(Clone)]
struct ScriptedServer {
    paging: Paging,
}

impl ScriptedServer {
    fn page(&self, index: usize) -> ListToolsResult {
        let (names, has_next) = match &self.paging {
            Paging::Pages(pages) => (
                pages.get(index).cloned().unwrap_or_default(),
                index + 1 < pages.len(),
            ),
            Paging::Endless => (vec!["echo"], true),
        };
        let tools = names
            .into_iter()
            .map(|name| {
                let mut schema = JsonObject::new();
                schema.insert("type".to_owned(), Value::from("object"));
                Tool::new(name, format!("{name} tool"), Arc::new(schema))
            })
            .collect();
        let mut page = ListToolsResult::with_all_items(tools);
        if has_next {
            page.next_cursor = Some((index + 1).to_string());
        }
        page
    }
}

impl ServerHandler for ScriptedServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "scripted-upstream".to_owned(),
                version: "0.0.0".to_owned(),
                ..Implementation::default()
            },
            instructions: None,
        }
    }

    fn list_tools(
        &self,
        request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        let index = request
            .and_then(|params| params.cursor)
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0);
        std::future::ready(Ok(self.page(index)))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        let arguments = Value::Object(request.arguments.unwrap_or_default());
        let text = format!("{} called with {arguments}", request.name);
        std::future::ready(Ok(CallToolResult::success(vec![Content::text(text)])))
    }
}

async fn record(State(log): State<TrafficLog>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let rpc_method = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|message| message.get("method").and_then(Value::as_str).map(str::to_owned));
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    log.push(Exchange {
        http_method: parts.method.clone(),
        rpc_method,
        authorization: header(AUTHORIZATION.as_str()),
        session_id: header(SESSION_HEADER),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// A running scripted upstream. Stops when dropped.
pub struct ScriptedUpstream {
    /// Endpoint URL.
    pub url: String,
    log: TrafficLog,
    task: JoinHandle<()>,
}

impl ScriptedUpstream {
    /// Starts a stateful server with the given listing behaviour.
    pub async fn start(paging: Paging) -> Self {
        let server = ScriptedServer { paging };
        let service = StreamableHttpService::new(
            move || Ok(server.clone()),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig::default(),
        );
        let log = TrafficLog::default();
        let app = Router::new()
            .route_service("/mcp", service)
            .layer(from_fn_with_state(log.clone(), record));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("loopback port should bind");
        let address = listener.local_addr().expect("listener has an address");
        let task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::warn!(error = %err, "scripted upstream stopped");
            }
        });
        Self {
            url: format!("http://{address}/mcp"),
            log,
            task,
        }
    }

    /// Every request seen so far.
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.log.snapshot()
    }

    /// JSON-RPC methods of the `POST` requests, in arrival order.
    pub fn posted_methods(&self) -> Vec<String> {
        self.exchanges()
            .into_iter()
            .filter(|exchange| exchange.http_method == Method::POST)
            .filter_map(|exchange| exchange.rpc_method)
            .collect()
    }

    /// Waits briefly for the client to tear its session down.
    pub async fn wait_for_delete(&self) -> Option<Exchange> {
        for _ in 0..50 {
            let deleted = self
                .exchanges()
                .into_iter()
                .find(|exchange| exchange.http_method == Method::DELETE);
            if deleted.is_some() {
                return deleted;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        None
    }
}

impl Drop for ScriptedUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}
